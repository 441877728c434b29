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

use std::str::FromStr;

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

use super::error::ConfigError;
use crate::config::{check_arg_too_long, check_path_too_long, ConfigCheck, KernelParams};

const DEFAULT_VCPUS: u32 = 1;
const DEFAULT_MEMORY_SIZE_MB: u64 = 2048;
const MIN_NR_CPUS: u64 = 1;
const MAX_NR_CPUS: u64 = 255;
const MIN_MEMORY_SIZE_MB: u64 = 128;

/// Config struct for the hypervisor section of a sandbox configuration.
///
/// Only read while an architecture provider is being created and while
/// the launch configuration is assembled.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HypervisorConfig {
    /// Requested machine type, empty selects the architecture default.
    pub machine_type: String,
    /// QEMU binary overriding the architecture path table.
    pub hypervisor_path: String,
    /// Extra kernel parameters, appended after the architecture ones.
    pub kernel_params: String,
    pub debug: bool,
    pub default_vcpus: u32,
    /// Zero means the same as `default_vcpus`.
    pub default_max_vcpus: u32,
    pub memory_size_mb: u64,
    pub disable_nesting_checks: bool,
}

impl Default for HypervisorConfig {
    fn default() -> Self {
        HypervisorConfig {
            machine_type: String::new(),
            hypervisor_path: String::new(),
            kernel_params: String::new(),
            debug: false,
            default_vcpus: DEFAULT_VCPUS,
            default_max_vcpus: 0,
            memory_size_mb: DEFAULT_MEMORY_SIZE_MB,
            disable_nesting_checks: false,
        }
    }
}

impl HypervisorConfig {
    /// Create `HypervisorConfig` from `Value` structure.
    ///
    /// # Arguments
    ///
    /// * `Value` - structure can be gotten by `json_file`.
    pub fn from_value(value: &serde_json::Value) -> Result<Self> {
        let config: HypervisorConfig = serde_json::from_value(value.clone())
            .map_err(|e| anyhow!(ConfigError::JsonSerde { source: e }))?;
        Ok(config)
    }

    pub fn max_vcpus(&self) -> u32 {
        if self.default_max_vcpus == 0 {
            self.default_vcpus
        } else {
            self.default_max_vcpus
        }
    }

    /// User supplied kernel parameters.
    pub fn user_kernel_params(&self) -> Result<KernelParams> {
        KernelParams::from_str(&self.kernel_params)
            .with_context(|| format!("Invalid kernel params: {}", self.kernel_params))
    }
}

impl ConfigCheck for HypervisorConfig {
    fn check(&self) -> Result<()> {
        check_arg_too_long(&self.machine_type, "machine type")?;
        check_path_too_long(&self.hypervisor_path, "hypervisor path")?;

        let vcpus = u64::from(self.default_vcpus);
        if !(MIN_NR_CPUS..=MAX_NR_CPUS).contains(&vcpus) {
            return Err(anyhow!(ConfigError::IllegalValue(
                "default vcpus".to_string(),
                MIN_NR_CPUS,
                true,
                MAX_NR_CPUS,
                true,
            )));
        }
        let max_vcpus = u64::from(self.max_vcpus());
        if !(vcpus..=MAX_NR_CPUS).contains(&max_vcpus) {
            return Err(anyhow!(ConfigError::IllegalValue(
                "default max vcpus".to_string(),
                vcpus,
                true,
                MAX_NR_CPUS,
                true,
            )));
        }
        if self.memory_size_mb < MIN_MEMORY_SIZE_MB {
            return Err(anyhow!(ConfigError::IllegalValue(
                "memory size (MiB)".to_string(),
                MIN_MEMORY_SIZE_MB,
                true,
                u64::MAX,
                true,
            )));
        }

        self.user_kernel_params()?.check()
    }
}

/// A QEMU machine profile and its option string.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Machine {
    pub machine_type: String,
    pub options: String,
}

impl Machine {
    pub fn new(machine_type: &str, options: &str) -> Self {
        Machine {
            machine_type: machine_type.to_string(),
            options: options.to_string(),
        }
    }
}

/// Guest memory layout handed to QEMU.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Memory {
    /// Boot memory, such as "2048M".
    pub size: String,
    /// Hotplug slots, unset when memory hotplug is not offered.
    pub slots: Option<u8>,
    /// Upper bound of hotplugged memory, such as "9216M".
    pub max_mem: Option<String>,
}

/// Format a MiB count the way QEMU's `-m` option takes it.
pub fn memory_size_string(size_mb: u64) -> String {
    format!("{}M", size_mb)
}

/// Guest cpu topology handed to QEMU.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Smp {
    pub cpus: u32,
    pub sockets: u32,
    pub cores: u32,
    pub threads: u32,
    pub max_cpus: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
pub enum ObjectDriver {
    #[strum(serialize = "nvdimm")]
    Nvdimm,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
pub enum ObjectType {
    #[strum(serialize = "memory-backend-file")]
    MemoryBackendFile,
}

/// Memory backend object plus the device exposing it to the guest.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryObject {
    pub driver: ObjectDriver,
    pub object_type: ObjectType,
    pub device_id: String,
    pub id: String,
    pub mem_path: String,
    /// Size in bytes.
    pub size: u64,
}
