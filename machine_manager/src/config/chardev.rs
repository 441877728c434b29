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

use anyhow::Result;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

use crate::config::{check_arg_too_long, check_path_too_long, ConfigCheck};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
pub enum SerialDeviceDriver {
    #[strum(serialize = "virtio-serial-pci")]
    VirtioSerial,
}

/// Virtio serial controller, the bus console and socket ports hang on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerialDevice {
    pub driver: SerialDeviceDriver,
    pub id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
pub enum CharDeviceDriver {
    #[strum(serialize = "virtconsole")]
    Console,
    #[strum(serialize = "virtserialport")]
    VirtioSerialPort,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
pub enum CharDeviceBackend {
    #[strum(serialize = "socket")]
    Socket,
}

/// Character device descriptor handed to QEMU.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharDevice {
    pub driver: CharDeviceDriver,
    pub backend: CharDeviceBackend,
    /// Id of the guest facing device.
    pub device_id: String,
    /// Id of the host side chardev.
    pub id: String,
    pub path: String,
    /// Port name seen by the guest.
    pub name: Option<String>,
}

/// Host socket exported to the guest through a virtio serial port.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Socket {
    pub device_id: String,
    pub id: String,
    pub host_path: String,
    pub name: String,
}

impl Socket {
    pub fn char_device(&self) -> CharDevice {
        CharDevice {
            driver: CharDeviceDriver::VirtioSerialPort,
            backend: CharDeviceBackend::Socket,
            device_id: self.device_id.clone(),
            id: self.id.clone(),
            path: self.host_path.clone(),
            name: Some(self.name.clone()),
        }
    }
}

impl ConfigCheck for Socket {
    fn check(&self) -> Result<()> {
        check_arg_too_long(&self.device_id, "socket device id")?;
        check_arg_too_long(&self.id, "socket id")?;
        check_arg_too_long(&self.name, "socket name")?;
        check_path_too_long(&self.host_path, "socket path")
    }
}
