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

//! # Machine
//!
//! Per architecture description of the QEMU machine a VM is launched on.
//!
//! ## Design
//!
//! `ArchOps` is the contract every architecture satisfies. Each architecture
//! owns an `ArchBase` holding its tables and the cross-architecture default
//! behaviour; the default trait methods delegate to it, and an architecture
//! overrides only the methods where it differs.
//!
//! A provider is built for one VM configuration and used by a single caller,
//! it holds no lock.

pub mod error;
pub mod ppc64le;
pub mod topology;

mod capabilities;

pub use anyhow::Result;
pub use capabilities::Capabilities;
pub use error::MachineError;
pub use ppc64le::Ppc64le;

use std::collections::HashMap;
use std::path::Path;

use anyhow::{anyhow, Context};
use log::{debug, info, warn};

use machine_manager::config::{
    memory_size_string, Bridge, BridgeType, CharDevice, CharDeviceBackend, CharDeviceDriver,
    Device, Drive, HypervisorConfig, IoThread, KernelParams, Machine, Memory, MemoryObject,
    ObjectDriver, ObjectType, Param, ScsiController, SerialDevice, SerialDeviceDriver, Smp,
    Socket, VfioDevice, Volume,
};
use util::host::{running_on_vmm, PROC_CPUINFO};

/// Cpu model handed to QEMU unless an architecture says otherwise.
pub const DEFAULT_CPU_MODEL: &str = "host";
/// Cpu model option hiding the PMU from guests of a nested host.
pub const PMU_OFF_OPTION: &str = ",pmu=off";

const DEFAULT_CORES: u32 = 1;
const DEFAULT_THREADS: u32 = 1;
const DEFAULT_MEM_SLOTS: u8 = 10;
// The NVDIMM device exposing the guest image needs 1024MB of memory space.
const NVDIMM_MEMORY_OFFSET_MB: u64 = 1024;

const NVDIMM_DEVICE_ID: &str = "nv0";
const NVDIMM_OBJECT_ID: &str = "mem0";
const SERIAL_CONTROLLER_ID: &str = "serial0";
const CONSOLE_DEVICE_ID: &str = "console0";
const CONSOLE_CHARDEV_ID: &str = "charconsole0";
const SCSI_CONTROLLER_ID: &str = "scsi0";
const IOTHREAD_ID: &str = "iothread0";

/// Kernel parameters added when the VM is launched without debug.
pub fn kernel_params_non_debug() -> Vec<Param> {
    vec![
        Param::new("quiet", ""),
        Param::new("systemd.show_status", "false"),
    ]
}

/// Kernel parameters added when the VM is launched with debug.
pub fn kernel_params_debug() -> Vec<Param> {
    vec![
        Param::new("debug", ""),
        Param::new("systemd.show_status", "true"),
        Param::new("systemd.log_level", "debug"),
    ]
}

/// Static data of one architecture.
#[derive(Clone, Debug)]
pub struct ArchTables {
    /// Machine type to qemu binary.
    pub qemu_paths: HashMap<String, String>,
    pub supported_machines: Vec<Machine>,
    /// Kernel parameters every boot gets, in command line order.
    pub kernel_params: Vec<Param>,
    pub kernel_params_debug: Vec<Param>,
    pub kernel_params_non_debug: Vec<Param>,
    /// Bus bridges are plugged on.
    pub bridge_bus: String,
    /// Most vcpus QEMU supports on this architecture.
    pub max_vcpus: u32,
}

/// Architecture independent state and default behaviour.
#[derive(Clone, Debug)]
pub struct ArchBase {
    machine_type: String,
    tables: ArchTables,
    /// The host is itself a guest of another hypervisor.
    nested_run: bool,
}

impl ArchBase {
    /// Unknown machine types are accepted, they only fail where a profile
    /// or a binary has to be looked up.
    pub fn new(machine_type: &str, tables: ArchTables) -> Self {
        ArchBase {
            machine_type: machine_type.to_string(),
            tables,
            nested_run: false,
        }
    }

    pub fn machine_type(&self) -> &str {
        &self.machine_type
    }

    pub fn tables(&self) -> &ArchTables {
        &self.tables
    }

    pub fn nested_run(&self) -> bool {
        self.nested_run
    }

    pub fn set_nested_run(&mut self, nested: bool) {
        self.nested_run = nested;
    }

    pub fn machine(&self) -> Result<Machine> {
        self.tables
            .supported_machines
            .iter()
            .find(|m| m.machine_type == self.machine_type)
            .cloned()
            .ok_or_else(|| anyhow!(MachineError::UnrecognisedMachineType(self.machine_type.clone())))
    }

    pub fn qemu_path(&self) -> Result<String> {
        self.tables
            .qemu_paths
            .get(&self.machine_type)
            .cloned()
            .ok_or_else(|| anyhow!(MachineError::UnknownMachineType(self.machine_type.clone())))
    }

    pub fn kernel_parameters(&self, debug: bool) -> KernelParams {
        let mut params = KernelParams::from(self.tables.kernel_params.as_slice());
        if debug {
            params.append(&self.tables.kernel_params_debug);
        } else {
            params.append(&self.tables.kernel_params_non_debug);
        }
        params
    }

    pub fn capabilities(&self) -> Capabilities {
        let mut caps = Capabilities::default();
        caps.set_block_device_hotplug_support();
        caps
    }

    pub fn bridges(&self, number: u32) -> Vec<Bridge> {
        topology::build_bridges(BridgeType::Pci, number)
    }

    pub fn cpu_topology(&self, vcpus: u32, max_vcpus: u32) -> Smp {
        let max_cpus = max_vcpus.min(self.tables.max_vcpus);
        Smp {
            cpus: vcpus.min(max_cpus),
            sockets: max_cpus,
            cores: DEFAULT_CORES,
            threads: DEFAULT_THREADS,
            max_cpus,
        }
    }

    pub fn cpu_model(&self) -> String {
        DEFAULT_CPU_MODEL.to_string()
    }

    pub fn memory_topology(&self, memory_mb: u64, host_memory_mb: u64) -> Memory {
        Memory {
            size: memory_size_string(memory_mb),
            slots: Some(DEFAULT_MEM_SLOTS),
            max_mem: Some(memory_size_string(
                host_memory_mb.saturating_add(NVDIMM_MEMORY_OFFSET_MB),
            )),
        }
    }

    pub fn append_console(&self, mut devices: Vec<Device>, path: &str) -> Vec<Device> {
        devices.push(Device::Serial(SerialDevice {
            driver: SerialDeviceDriver::VirtioSerial,
            id: SERIAL_CONTROLLER_ID.to_string(),
        }));
        devices.push(Device::Char(CharDevice {
            driver: CharDeviceDriver::Console,
            backend: CharDeviceBackend::Socket,
            device_id: CONSOLE_DEVICE_ID.to_string(),
            id: CONSOLE_CHARDEV_ID.to_string(),
            path: path.to_string(),
            name: None,
        }));
        devices
    }

    /// Expose the guest image as an NVDIMM backed by the image file.
    pub fn append_image(&self, mut devices: Vec<Device>, path: &str) -> Result<Vec<Device>> {
        let metadata = match std::fs::metadata(path) {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(e).with_context(|| MachineError::ImageNotFound(path.to_string()));
            }
            Err(e) => {
                return Err(e).with_context(|| MachineError::ImageMetadata(path.to_string()));
            }
        };

        devices.push(Device::Object(MemoryObject {
            driver: ObjectDriver::Nvdimm,
            object_type: ObjectType::MemoryBackendFile,
            device_id: NVDIMM_DEVICE_ID.to_string(),
            id: NVDIMM_OBJECT_ID.to_string(),
            mem_path: path.to_string(),
            size: metadata.len(),
        }));
        Ok(devices)
    }

    /// Returns the IO thread the controller was bound to, if any.
    pub fn append_scsi_controller(
        &self,
        mut devices: Vec<Device>,
        enable_iothreads: bool,
    ) -> (Vec<Device>, Option<IoThread>) {
        let mut controller = ScsiController::new(SCSI_CONTROLLER_ID);
        let iothread = if enable_iothreads {
            let iothread = IoThread::new(IOTHREAD_ID);
            controller.iothread = Some(iothread.id.clone());
            Some(iothread)
        } else {
            None
        };

        devices.push(Device::Scsi(controller));
        (devices, iothread)
    }

    pub fn append_bridges(&self, devices: Vec<Device>, bridges: &[Bridge]) -> Vec<Device> {
        topology::emit_bridges(devices, bridges, &self.tables.bridge_bus)
    }

    pub fn append_9p_volume(&self, mut devices: Vec<Device>, volume: &Volume) -> Vec<Device> {
        if !volume.is_complete() {
            return devices;
        }
        devices.push(Device::Fs(volume.fs_device()));
        devices
    }

    pub fn append_socket(&self, mut devices: Vec<Device>, socket: &Socket) -> Vec<Device> {
        devices.push(Device::Char(socket.char_device()));
        devices
    }

    pub fn append_block_device(&self, mut devices: Vec<Device>, drive: &Drive) -> Vec<Device> {
        if !drive.is_complete() {
            return devices;
        }
        devices.push(Device::Block(drive.block_device()));
        devices
    }

    pub fn append_vfio_device(&self, mut devices: Vec<Device>, bdf: &str) -> Vec<Device> {
        if bdf.is_empty() {
            return devices;
        }
        devices.push(Device::Vfio(VfioDevice::new(bdf)));
        devices
    }
}

/// Contract between the VMM launcher and one architecture.
///
/// Device lists are taken by value and the extended list is returned, the
/// provider never keeps them.
pub trait ArchOps: Send {
    fn arch_base(&self) -> &ArchBase;

    fn arch_base_mut(&mut self) -> &mut ArchBase;

    fn machine_type(&self) -> &str {
        self.arch_base().machine_type()
    }

    fn supported_machines(&self) -> &[Machine] {
        &self.arch_base().tables().supported_machines
    }

    /// The supported profile of the selected machine type.
    fn machine(&self) -> Result<Machine> {
        self.arch_base().machine()
    }

    /// Path of the qemu binary for the selected machine type.
    fn qemu_path(&self) -> Result<String> {
        self.arch_base().qemu_path()
    }

    /// Architecture kernel parameters followed by the debug or non-debug set.
    fn kernel_parameters(&self, debug: bool) -> KernelParams {
        self.arch_base().kernel_parameters(debug)
    }

    /// Detect whether the host runs nested, from the host cpu flags.
    fn enable_nesting_checks(&mut self) {
        let nested = match running_on_vmm(Path::new(PROC_CPUINFO)) {
            Ok(nested) => nested,
            Err(e) => {
                warn!("Failed to check if running nested, assume not: {:?}", e);
                false
            }
        };
        info!("Nested virtualization host: {}", nested);
        self.set_nested_run(nested);
    }

    fn disable_nesting_checks(&mut self) {
        self.set_nested_run(false);
    }

    fn set_nested_run(&mut self, nested: bool) {
        self.arch_base_mut().set_nested_run(nested);
    }

    fn run_nested(&self) -> bool {
        self.arch_base().nested_run()
    }

    fn capabilities(&self) -> Capabilities {
        self.arch_base().capabilities()
    }

    fn bridges(&self, number: u32) -> Vec<Bridge> {
        self.arch_base().bridges(number)
    }

    fn cpu_topology(&self, vcpus: u32, max_vcpus: u32) -> Smp {
        self.arch_base().cpu_topology(vcpus, max_vcpus)
    }

    fn cpu_model(&self) -> String {
        self.arch_base().cpu_model()
    }

    /// # Arguments
    ///
    /// * `memory_mb` - Boot memory of the guest.
    /// * `host_memory_mb` - Memory of the host, bounds memory hotplug.
    fn memory_topology(&self, memory_mb: u64, host_memory_mb: u64) -> Memory {
        self.arch_base().memory_topology(memory_mb, host_memory_mb)
    }

    fn append_console(&self, devices: Vec<Device>, path: &str) -> Vec<Device> {
        self.arch_base().append_console(devices, path)
    }

    /// Attach the guest image found at `path`.
    ///
    /// # Errors
    ///
    /// * `ImageNotFound` - `path` does not exist.
    fn append_image(&self, devices: Vec<Device>, path: &str) -> Result<Vec<Device>> {
        self.arch_base().append_image(devices, path)
    }

    fn append_scsi_controller(
        &self,
        devices: Vec<Device>,
        enable_iothreads: bool,
    ) -> (Vec<Device>, Option<IoThread>) {
        self.arch_base()
            .append_scsi_controller(devices, enable_iothreads)
    }

    fn append_bridges(&self, devices: Vec<Device>, bridges: &[Bridge]) -> Vec<Device> {
        self.arch_base().append_bridges(devices, bridges)
    }

    fn append_9p_volume(&self, devices: Vec<Device>, volume: &Volume) -> Vec<Device> {
        self.arch_base().append_9p_volume(devices, volume)
    }

    fn append_socket(&self, devices: Vec<Device>, socket: &Socket) -> Vec<Device> {
        self.arch_base().append_socket(devices, socket)
    }

    fn append_block_device(&self, devices: Vec<Device>, drive: &Drive) -> Vec<Device> {
        self.arch_base().append_block_device(devices, drive)
    }

    fn append_vfio_device(&self, devices: Vec<Device>, bdf: &str) -> Vec<Device> {
        self.arch_base().append_vfio_device(devices, bdf)
    }

    /// Apply the nesting policy of the configuration.
    fn setup_nesting(&mut self, config: &HypervisorConfig) {
        if config.disable_nesting_checks {
            self.disable_nesting_checks();
        } else {
            self.enable_nesting_checks();
        }
    }

    /// Kernel command line of the VM: architecture parameters, then the
    /// user supplied ones.
    fn effective_kernel_params(&self, config: &HypervisorConfig) -> Result<KernelParams> {
        let mut params = self.kernel_parameters(config.debug);
        let user_params = config.user_kernel_params()?;
        params.append(&user_params.params);
        Ok(params)
    }

    /// The configured hypervisor binary, or the one of the machine type.
    fn effective_qemu_path(&self, config: &HypervisorConfig) -> Result<String> {
        if !config.hypervisor_path.is_empty() {
            return Ok(config.hypervisor_path.clone());
        }
        self.qemu_path()
    }
}

/// Pick the requested machine type, or the architecture default when empty.
pub fn resolve_machine_type(config: &HypervisorConfig, default: &str) -> String {
    if config.machine_type.is_empty() {
        debug!("No machine type requested, use default {}", default);
        default.to_string()
    } else {
        config.machine_type.clone()
    }
}

/// Name of the architecture this binary runs on.
pub fn host_arch() -> &'static str {
    std::env::consts::ARCH
}

/// Create the provider of architecture `arch`.
///
/// # Arguments
///
/// * `arch` - Architecture name, such as `host_arch()`.
/// * `config` - Hypervisor configuration of the VM.
pub fn new_qemu_arch(arch: &str, config: &HypervisorConfig) -> Result<Box<dyn ArchOps>> {
    match arch {
        "ppc64le" | "powerpc64" => Ok(Box::new(Ppc64le::new(config))),
        _ => Err(anyhow!(MachineError::UnsupportedArch(arch.to_string()))),
    }
}
