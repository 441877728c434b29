// Copyright (c) 2020 Huawei Technologies Co.,Ltd. All rights reserved.
//
// Stratovirt is licensed under Mulan PSL v2.
// You can use this software according to the terms and conditions of the Mulan
// PSL v2.
// You may obtain a copy of Mulan PSL v2 at:
//         http://license.coscl.org.cn/MulanPSL2
// THIS SOFTWARE IS PROVIDED ON AN "AS IS" BASIS, WITHOUT WARRANTIES OF ANY
// KIND, EITHER EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO
// NON-INFRINGEMENT, MERCHANTABILITY OR FIT FOR A PARTICULAR PURPOSE.
// See the Mulan PSL v2 for more details.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

/// Kind of bus a bridge extends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize)]
pub enum BridgeType {
    #[strum(serialize = "pci")]
    Pci,
    #[strum(serialize = "pcie")]
    Pcie,
}

/// A bridge requested for the guest, before it is turned into a device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bridge {
    pub bridge_type: BridgeType,
    pub id: String,
    /// Slot number to the id of the device plugged there.
    pub address: HashMap<u32, String>,
    /// Unique within a batch of bridges, starts from 1.
    pub chassis: u32,
}

impl Bridge {
    /// Create the `index`th bridge of a batch, like "pci-bridge-0".
    pub fn new(bridge_type: BridgeType, index: u32) -> Self {
        Bridge {
            bridge_type,
            id: format!("{}-bridge-{}", bridge_type, index),
            address: HashMap::new(),
            chassis: index + 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
pub enum BridgeDeviceType {
    #[strum(serialize = "pci-bridge")]
    PciBridge,
    #[strum(serialize = "pcie-pci-bridge")]
    PcieBridge,
}

impl From<BridgeType> for BridgeDeviceType {
    fn from(bridge_type: BridgeType) -> Self {
        match bridge_type {
            BridgeType::Pci => BridgeDeviceType::PciBridge,
            BridgeType::Pcie => BridgeDeviceType::PcieBridge,
        }
    }
}

/// Bridge device descriptor handed to QEMU.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BridgeDevice {
    pub device_type: BridgeDeviceType,
    /// Bus the bridge is plugged on.
    pub bus: String,
    pub id: String,
    pub chassis: u32,
    /// Standard hot-plug controller.
    pub shpc: bool,
}
