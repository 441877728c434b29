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

use crate::config::{check_arg_too_long, check_path_too_long, truncate_dev_id, ConfigCheck};

/// Block backend description, the file a block device is built on.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Drive {
    /// Path of the backing file on the host.
    pub file: String,
    /// Image format, such as "raw".
    pub format: String,
    pub id: String,
}

impl Drive {
    pub fn new(file: &str, format: &str, id: &str) -> Self {
        Drive {
            file: file.to_string(),
            format: format.to_string(),
            id: id.to_string(),
        }
    }

    /// A drive without file, format or id can't back a device.
    pub fn is_complete(&self) -> bool {
        !self.file.is_empty() && !self.format.is_empty() && !self.id.is_empty()
    }

    /// Build the virtio-blk device for this drive.
    pub fn block_device(&self) -> BlockDevice {
        BlockDevice {
            driver: BlockDeviceDriver::VirtioBlock,
            id: truncate_dev_id(&self.id),
            file: self.file.clone(),
            aio: BlockDeviceAio::Threads,
            format: self.format.clone(),
            interface: BlockDeviceInterface::NoInterface,
        }
    }
}

impl ConfigCheck for Drive {
    fn check(&self) -> Result<()> {
        check_arg_too_long(&self.id, "drive id")?;
        check_arg_too_long(&self.format, "drive format")?;
        check_path_too_long(&self.file, "drive file")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
pub enum BlockDeviceDriver {
    #[strum(serialize = "virtio-blk")]
    VirtioBlock,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
pub enum BlockDeviceAio {
    #[strum(serialize = "threads")]
    Threads,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
pub enum BlockDeviceInterface {
    #[strum(serialize = "none")]
    NoInterface,
}

/// Block device descriptor handed to QEMU.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockDevice {
    pub driver: BlockDeviceDriver,
    pub id: String,
    pub file: String,
    pub aio: BlockDeviceAio,
    pub format: String,
    pub interface: BlockDeviceInterface,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MAX_DEV_ID_SIZE;

    #[test]
    fn test_drive_block_device() {
        let drive = Drive::new("/var/lib/images/rootfs.img", "raw", "image-0011223344556677");
        assert!(drive.is_complete());
        assert!(drive.check().is_ok());

        let blk = drive.block_device();
        assert_eq!(blk.driver, BlockDeviceDriver::VirtioBlock);
        assert_eq!(blk.id, "image-0011223344556677");
        assert_eq!(blk.file, "/var/lib/images/rootfs.img");
        assert_eq!(blk.format, "raw");
        assert_eq!(blk.aio.to_string(), "threads");
        assert_eq!(blk.interface.to_string(), "none");
    }

    #[test]
    fn test_drive_long_id() {
        let drive = Drive::new("/tmp/disk", "qcow2", &"d".repeat(40));
        assert_eq!(drive.block_device().id.len(), MAX_DEV_ID_SIZE);

        assert!(!Drive::new("", "raw", "drive0").is_complete());
        assert!(!Drive::new("/tmp/disk", "", "drive0").is_complete());
        assert!(!Drive::new("/tmp/disk", "raw", "").is_complete());
    }
}
