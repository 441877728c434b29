// Copyright (c) 2020 Huawei Technologies Co.,Ltd. All rights reserved.
//
// StratoVirt is licensed under Mulan PSL v2.
// You can use this software according to the terms and conditions of the Mulan
// PSL v2.
// You may obtain a copy of Mulan PSL v2 at:
//         http://license.coscl.org.cn/MulanPSL2
// THIS SOFTWARE IS PROVIDED ON AN "AS IS" BASIS, WITHOUT WARRANTIES OF ANY
// KIND, EITHER EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO
// NON-INFRINGEMENT, MERCHANTABILITY OR FIT FOR A PARTICULAR PURPOSE.
// See the Mulan PSL v2 for more details.

use serde::{Deserialize, Serialize};

use crate::config::{
    BlockDevice, BridgeDevice, CharDevice, FsDevice, MemoryObject, ScsiController, SerialDevice,
    VfioDevice,
};

/// Device descriptor appended to the launch configuration, in QEMU order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Device {
    Bridge(BridgeDevice),
    Block(BlockDevice),
    Object(MemoryObject),
    Serial(SerialDevice),
    Char(CharDevice),
    Fs(FsDevice),
    Scsi(ScsiController),
    Vfio(VfioDevice),
}

impl Device {
    /// Id the device is known by in QEMU, the host address for vfio.
    pub fn id(&self) -> &str {
        match self {
            Device::Bridge(dev) => &dev.id,
            Device::Block(dev) => &dev.id,
            Device::Object(dev) => &dev.device_id,
            Device::Serial(dev) => &dev.id,
            Device::Char(dev) => &dev.device_id,
            Device::Fs(dev) => &dev.id,
            Device::Scsi(dev) => &dev.id,
            Device::Vfio(dev) => &dev.bdf,
        }
    }
}

macro_rules! impl_from_device {
    ($variant:ident, $dev:ty) => {
        impl From<$dev> for Device {
            fn from(dev: $dev) -> Self {
                Device::$variant(dev)
            }
        }
    };
}

impl_from_device!(Bridge, BridgeDevice);
impl_from_device!(Block, BlockDevice);
impl_from_device!(Object, MemoryObject);
impl_from_device!(Serial, SerialDevice);
impl_from_device!(Char, CharDevice);
impl_from_device!(Fs, FsDevice);
impl_from_device!(Scsi, ScsiController);
impl_from_device!(Vfio, VfioDevice);
