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

use std::collections::HashMap;

use anyhow::Context;
use log::{debug, info};

use crate::{
    kernel_params_debug, kernel_params_non_debug, resolve_machine_type, topology, ArchBase,
    ArchOps, ArchTables, Capabilities, MachineError, Result, DEFAULT_CPU_MODEL, PMU_OFF_OPTION,
};
use machine_manager::config::{
    make_name_id, memory_size_string, Bridge, BridgeType, Device, Drive, HypervisorConfig,
    Machine, Memory, Param,
};
use util::random::generate_random_bytes;

/// IBM pSeries machine, the only one offering block device hotplug here.
pub const QEMU_PPC64LE: &str = "pseries";

const DEFAULT_QEMU_PATH: &str = "/usr/libexec/qemu-kvm";
const DEFAULT_QEMU_MACHINE_TYPE: &str = QEMU_PPC64LE;
const DEFAULT_QEMU_MACHINE_OPTIONS: &str = "accel=kvm,usb=off";
const DEFAULT_PCI_BRIDGE_BUS: &str = "pci.0";
const MAX_QEMU_VCPUS: u32 = 128;

const IMAGE_ID_TAG: &str = "image";
const IMAGE_ID_RANDOM_BYTES: usize = 8;
const IMAGE_FORMAT: &str = "raw";

fn kernel_params() -> Vec<Param> {
    vec![
        Param::new("tsc", "reliable"),
        Param::new("no_timer_check", ""),
        Param::new("rcupdate.rcu_expedited", "1"),
        Param::new("i8042.direct", "1"),
        Param::new("i8042.dumbkbd", "1"),
        Param::new("i8042.nopnp", "1"),
        Param::new("i8042.noaux", "1"),
        Param::new("noreplace-smp", ""),
        Param::new("reboot", "k"),
        Param::new("console", "hvc0"),
        Param::new("console", "hvc1"),
        Param::new("iommu", "off"),
        Param::new("cryptomgr.notests", ""),
        Param::new("net.ifnames", "0"),
        Param::new("pci", "lastbus=0"),
    ]
}

fn arch_tables() -> ArchTables {
    let mut qemu_paths = HashMap::new();
    qemu_paths.insert(QEMU_PPC64LE.to_string(), DEFAULT_QEMU_PATH.to_string());

    ArchTables {
        qemu_paths,
        supported_machines: vec![Machine::new(QEMU_PPC64LE, DEFAULT_QEMU_MACHINE_OPTIONS)],
        kernel_params: kernel_params(),
        kernel_params_debug: kernel_params_debug(),
        kernel_params_non_debug: kernel_params_non_debug(),
        bridge_bus: DEFAULT_PCI_BRIDGE_BUS.to_string(),
        max_vcpus: MAX_QEMU_VCPUS,
    }
}

/// Most vcpus QEMU supports on ppc64le.
pub fn max_qemu_vcpus() -> u32 {
    MAX_QEMU_VCPUS
}

/// QEMU on 64-bit little endian POWER.
pub struct Ppc64le {
    base: ArchBase,
}

impl Ppc64le {
    pub fn new(config: &HypervisorConfig) -> Self {
        let machine_type = resolve_machine_type(config, DEFAULT_QEMU_MACHINE_TYPE);
        info!("Create ppc64le arch with machine type {}", machine_type);

        Ppc64le {
            base: ArchBase::new(&machine_type, arch_tables()),
        }
    }

    /// Attach the image as a raw virtio-blk drive, its id suffixed with
    /// bytes drawn from `random_bytes`.
    fn attach_image<F>(
        &self,
        devices: Vec<Device>,
        path: &str,
        random_bytes: F,
    ) -> Result<Vec<Device>>
    where
        F: FnOnce(usize) -> Result<Vec<u8>>,
    {
        if let Err(e) = std::fs::metadata(path) {
            if e.kind() == std::io::ErrorKind::NotFound {
                return Err(e).with_context(|| MachineError::ImageNotFound(path.to_string()));
            }
        }

        let rand_bytes = random_bytes(IMAGE_ID_RANDOM_BYTES)
            .with_context(|| MachineError::EntropyUnavailable(path.to_string()))?;
        let id = make_name_id(IMAGE_ID_TAG, &hex::encode(rand_bytes));
        debug!("Attach image {} as block device {}", path, id);

        let drive = Drive::new(path, IMAGE_FORMAT, &id);
        Ok(self.append_block_device(devices, &drive))
    }
}

impl ArchOps for Ppc64le {
    fn arch_base(&self) -> &ArchBase {
        &self.base
    }

    fn arch_base_mut(&mut self) -> &mut ArchBase {
        &mut self.base
    }

    fn capabilities(&self) -> Capabilities {
        let mut caps = Capabilities::default();

        // Only pseries supports hotplugging drives.
        if self.machine_type() == QEMU_PPC64LE {
            caps.set_block_device_hotplug_support();
        }

        caps
    }

    fn bridges(&self, number: u32) -> Vec<Bridge> {
        let bridge_type = match self.machine_type() {
            QEMU_PPC64LE => BridgeType::Pci,
            _ => return Vec::new(),
        };

        topology::build_bridges(bridge_type, number)
    }

    fn cpu_model(&self) -> String {
        let mut cpu_model = DEFAULT_CPU_MODEL.to_string();
        if self.run_nested() {
            cpu_model.push_str(PMU_OFF_OPTION);
        }
        cpu_model
    }

    fn memory_topology(&self, memory_mb: u64, _host_memory_mb: u64) -> Memory {
        // No NVDIMM on ppc64le, so no memory hotplug slots to reserve.
        Memory {
            size: memory_size_string(memory_mb),
            slots: None,
            max_mem: None,
        }
    }

    fn append_image(&self, devices: Vec<Device>, path: &str) -> Result<Vec<Device>> {
        self.attach_image(devices, path, generate_random_bytes)
    }

    fn append_bridges(&self, devices: Vec<Device>, bridges: &[Bridge]) -> Vec<Device> {
        topology::emit_bridges(devices, bridges, DEFAULT_PCI_BRIDGE_BUS)
    }
}
