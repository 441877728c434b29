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

//! # qemu_arch
//!
//! Decide, per host architecture, how the QEMU machine of a VM is configured:
//! machine type, capabilities, bridges, kernel parameters and the devices
//! attaching the guest image. The VMM launcher consumes the descriptors.

pub use machine::{
    host_arch, new_qemu_arch, topology, ArchBase, ArchOps, ArchTables, Capabilities,
    MachineError, Ppc64le,
};
pub use machine_manager::config;
pub use util::logger::init_log;
