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

pub mod error;

mod boot_source;
mod chardev;
mod devices;
mod drive;
mod fs;
mod iothread;
mod machine_config;
mod pci;
mod scsi;
mod vfio;

pub use boot_source::*;
pub use chardev::*;
pub use devices::*;
pub use drive::*;
pub use error::ConfigError;
pub use fs::*;
pub use iothread::*;
pub use machine_config::*;
pub use pci::*;
pub use scsi::*;
pub use vfio::*;

use anyhow::{anyhow, Result};

pub const MAX_STRING_LENGTH: usize = 255;
pub const MAX_PATH_LENGTH: usize = 4096;
/// Longest device id accepted by QEMU.
pub const MAX_DEV_ID_SIZE: usize = 31;

/// This trait is to check the legality of Config structure.
pub trait ConfigCheck: Send + Sync {
    /// To check the legality of Config structure.
    ///
    /// # Errors
    ///
    /// * `StringLengthTooLong` - Limit the length of String.
    /// * `IllegalValue` - A number is out of range.
    fn check(&self) -> Result<()>;
}

pub fn check_arg_too_long(arg: &str, name: &str) -> Result<()> {
    if arg.len() > MAX_STRING_LENGTH {
        return Err(anyhow!(ConfigError::StringLengthTooLong(
            name.to_string(),
            MAX_STRING_LENGTH
        )));
    }
    Ok(())
}

pub fn check_path_too_long(arg: &str, name: &str) -> Result<()> {
    if arg.len() > MAX_PATH_LENGTH {
        return Err(anyhow!(ConfigError::StringLengthTooLong(
            name.to_string(),
            MAX_PATH_LENGTH
        )));
    }
    Ok(())
}

/// Cut a device id down to `MAX_DEV_ID_SIZE` characters.
pub fn truncate_dev_id(id: &str) -> String {
    id.chars().take(MAX_DEV_ID_SIZE).collect()
}

/// Build a device id like "image-0a1b2c3d" from a type tag and a unique suffix.
pub fn make_name_id(named_type: &str, id: &str) -> String {
    truncate_dev_id(&format!("{}-{}", named_type, id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_make_name_id() {
        assert_eq!(make_name_id("image", "0011aabb"), "image-0011aabb");

        let long = make_name_id("image", "0123456789abcdef0123456789abcdef");
        assert_eq!(long.len(), MAX_DEV_ID_SIZE);
        assert_eq!(long, "image-0123456789abcdef0123456789");
    }

    #[test]
    fn test_check_arg_too_long() {
        assert!(check_arg_too_long("pci-bridge-0", "id").is_ok());

        let arg = "a".repeat(MAX_STRING_LENGTH + 1);
        let err = check_arg_too_long(&arg, "id").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ConfigError>(),
            Some(ConfigError::StringLengthTooLong(_, MAX_STRING_LENGTH))
        ));

        assert!(check_path_too_long(&arg, "path").is_ok());
        let path = "/".repeat(MAX_PATH_LENGTH + 1);
        assert!(check_path_too_long(&path, "path").is_err());
    }
}
