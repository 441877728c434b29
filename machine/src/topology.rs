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

//! Bridge topology shared by all architectures.

use log::debug;
use machine_manager::config::{Bridge, BridgeDevice, BridgeDeviceType, BridgeType, Device};

/// Build a batch of `count` bridges of one kind, named "<kind>-bridge-<i>".
pub fn build_bridges(bridge_type: BridgeType, count: u32) -> Vec<Bridge> {
    (0..count).map(|i| Bridge::new(bridge_type, i)).collect()
}

/// Append one bridge device per bridge, in order, plugged on `bus`.
pub fn emit_bridges(mut devices: Vec<Device>, bridges: &[Bridge], bus: &str) -> Vec<Device> {
    for (idx, bridge) in bridges.iter().enumerate() {
        debug!("Append bridge {} on bus {}", bridge.id, bus);
        devices.push(Device::Bridge(BridgeDevice {
            device_type: BridgeDeviceType::from(bridge.bridge_type),
            bus: bus.to_string(),
            id: bridge.id.clone(),
            // Each bridge needs a unique chassis id > 0.
            chassis: idx as u32 + 1,
            shpc: true,
        }));
    }
    devices
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_build_bridges() {
        assert!(build_bridges(BridgeType::Pci, 0).is_empty());

        let bridges = build_bridges(BridgeType::Pcie, 5);
        assert_eq!(bridges.len(), 5);
        let ids: HashSet<&str> = bridges.iter().map(|b| b.id.as_str()).collect();
        assert_eq!(ids.len(), 5);
        for (i, bridge) in bridges.iter().enumerate() {
            assert_eq!(bridge.bridge_type, BridgeType::Pcie);
            assert_eq!(bridge.id, format!("pcie-bridge-{}", i));
            assert_eq!(bridge.chassis, i as u32 + 1);
        }
    }

    #[test]
    fn test_emit_bridges() {
        let mut bridges = build_bridges(BridgeType::Pci, 1);
        bridges.push(Bridge::new(BridgeType::Pcie, 7));
        let devices = vec![Device::Vfio(machine_manager::config::VfioDevice::new(
            "0000:01:00.0",
        ))];

        let devices = emit_bridges(devices, &bridges, "pcie.0");
        assert_eq!(devices.len(), 3);
        assert_eq!(devices[0].id(), "0000:01:00.0");

        let expected = [
            (BridgeDeviceType::PciBridge, "pci-bridge-0", 1),
            (BridgeDeviceType::PcieBridge, "pcie-bridge-7", 2),
        ];
        for (dev, (device_type, id, chassis)) in devices[1..].iter().zip(expected.iter()) {
            match dev {
                Device::Bridge(bridge) => {
                    assert_eq!(bridge.device_type, *device_type);
                    assert_eq!(bridge.id, *id);
                    assert_eq!(bridge.chassis, *chassis);
                    assert_eq!(bridge.bus, "pcie.0");
                    assert!(bridge.shpc);
                }
                _ => panic!("Expect a bridge device, found {:?}", dev),
            }
        }
    }
}
