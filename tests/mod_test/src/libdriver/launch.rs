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
use qemu_arch::config::{Device, HypervisorConfig, KernelParams, Memory, Smp};
use qemu_arch::{ArchOps, Capabilities};

pub const TEST_CONSOLE_PATH: &str = "/run/vc/vm/test/console.sock";

/// What a launcher gathers from a provider before building the qemu command.
pub struct TestLaunchConfig {
    pub machine_type: String,
    pub machine_options: String,
    pub qemu_path: String,
    pub cpu_model: String,
    pub smp: Smp,
    pub memory: Memory,
    pub capabilities: Capabilities,
    pub kernel_params: KernelParams,
    pub devices: Vec<Device>,
}

impl TestLaunchConfig {
    /// Assemble the launch configuration of `config` with `bridges` bridges,
    /// a console and the guest image at `image`.
    pub fn assemble(
        arch: &dyn ArchOps,
        config: &HypervisorConfig,
        bridges: u32,
        image: &str,
        host_memory_mb: u64,
    ) -> Result<Self> {
        let machine = arch.machine()?;

        let devices = arch.append_bridges(Vec::new(), &arch.bridges(bridges));
        let devices = arch.append_console(devices, TEST_CONSOLE_PATH);
        let devices = arch.append_image(devices, image)?;

        Ok(TestLaunchConfig {
            machine_type: machine.machine_type,
            machine_options: machine.options,
            qemu_path: arch.effective_qemu_path(config)?,
            cpu_model: arch.cpu_model(),
            smp: arch.cpu_topology(config.default_vcpus, config.max_vcpus()),
            memory: arch.memory_topology(config.memory_size_mb, host_memory_mb),
            capabilities: arch.capabilities(),
            kernel_params: arch.effective_kernel_params(config)?,
            devices,
        })
    }
}
