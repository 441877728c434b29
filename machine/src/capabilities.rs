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

const BLOCK_DEVICE_SUPPORT: u32 = 1 << 0;
const BLOCK_DEVICE_HOTPLUG_SUPPORT: u32 = 1 << 1;
const MULTI_QUEUE_SUPPORT: u32 = 1 << 2;

/// Features the VMM offers for the selected machine type.
///
/// Capabilities are only granted through the setters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capabilities {
    flags: u32,
}

impl Capabilities {
    pub fn is_empty(&self) -> bool {
        self.flags == 0
    }

    pub fn is_block_device_supported(&self) -> bool {
        self.flags & BLOCK_DEVICE_SUPPORT != 0
    }

    pub fn set_block_device_support(&mut self) {
        self.flags |= BLOCK_DEVICE_SUPPORT;
    }

    pub fn is_block_device_hotplug_supported(&self) -> bool {
        self.flags & BLOCK_DEVICE_HOTPLUG_SUPPORT != 0
    }

    pub fn set_block_device_hotplug_support(&mut self) {
        self.flags |= BLOCK_DEVICE_HOTPLUG_SUPPORT;
    }

    pub fn is_multi_queue_supported(&self) -> bool {
        self.flags & MULTI_QUEUE_SUPPORT != 0
    }

    pub fn set_multi_queue_support(&mut self) {
        self.flags |= MULTI_QUEUE_SUPPORT;
    }
}
