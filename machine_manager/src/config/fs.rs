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

use crate::config::{check_arg_too_long, check_path_too_long, make_name_id, ConfigCheck};

/// Host directory shared with the guest over 9p.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Volume {
    /// Tag the guest mounts the share by.
    pub mount_tag: String,
    pub host_path: String,
}

impl Volume {
    pub fn new(mount_tag: &str, host_path: &str) -> Self {
        Volume {
            mount_tag: mount_tag.to_string(),
            host_path: host_path.to_string(),
        }
    }

    pub fn is_complete(&self) -> bool {
        !self.mount_tag.is_empty() && !self.host_path.is_empty()
    }

    /// Build the virtio-9p device sharing this volume.
    pub fn fs_device(&self) -> FsDevice {
        FsDevice {
            driver: FsDriver::Virtio9P,
            fs_driver: FsBackend::Local,
            id: make_name_id("extra-9p", &self.mount_tag),
            path: self.host_path.clone(),
            mount_tag: self.mount_tag.clone(),
            security_model: SecurityModel::NoModel,
        }
    }
}

impl ConfigCheck for Volume {
    fn check(&self) -> Result<()> {
        check_arg_too_long(&self.mount_tag, "mount tag")?;
        check_path_too_long(&self.host_path, "volume host path")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
pub enum FsDriver {
    #[strum(serialize = "virtio-9p-pci")]
    Virtio9P,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
pub enum FsBackend {
    #[strum(serialize = "local")]
    Local,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
pub enum SecurityModel {
    #[strum(serialize = "none")]
    NoModel,
}

/// Shared filesystem device descriptor handed to QEMU.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FsDevice {
    pub driver: FsDriver,
    pub fs_driver: FsBackend,
    pub id: String,
    pub path: String,
    pub mount_tag: String,
    pub security_model: SecurityModel,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MAX_DEV_ID_SIZE;

    #[test]
    fn test_volume_fs_device() {
        let volume = Volume::new("kataShared", "/run/kata-containers/shared/sandboxes/foo");
        assert!(volume.is_complete());
        assert!(volume.check().is_ok());

        let fs = volume.fs_device();
        assert_eq!(fs.id, "extra-9p-kataShared");
        assert_eq!(fs.mount_tag, "kataShared");
        assert_eq!(fs.driver.to_string(), "virtio-9p-pci");
        assert_eq!(fs.fs_driver.to_string(), "local");
        assert_eq!(fs.security_model.to_string(), "none");

        let volume = Volume::new("a-very-long-mount-tag-for-a-volume", "/tmp");
        assert_eq!(volume.fs_device().id.len(), MAX_DEV_ID_SIZE);

        assert!(!Volume::new("", "/tmp").is_complete());
        assert!(!Volume::new("tag", "").is_complete());
    }
}
