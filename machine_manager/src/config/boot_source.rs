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

use std::fmt;
use std::str::FromStr;

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};

use super::error::ConfigError;
use crate::config::{ConfigCheck, MAX_STRING_LENGTH};

/// One kernel boot parameter.
///
/// # Notes
///
/// `key=value` is rendered as is, a parameter with empty value such as
/// `quiet` is rendered as its key only.
#[derive(Default, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Param {
    pub key: String,
    pub value: String,
}

impl Param {
    pub fn new(key: &str, value: &str) -> Self {
        Param {
            key: key.to_string(),
            value: value.to_string(),
        }
    }
}

impl FromStr for Param {
    type Err = anyhow::Error;

    fn from_str(item: &str) -> Result<Self> {
        let (key, value) = item.split_once('=').unwrap_or((item, ""));
        if key.is_empty() {
            return Err(anyhow!(ConfigError::InvalidKernelParam(item.to_string())));
        }
        Ok(Param::new(key, value))
    }
}

impl fmt::Display for Param {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.value.is_empty() {
            write!(f, "{}", self.key)
        } else {
            write!(f, "{}={}", self.key, self.value)
        }
    }
}

/// Ordered kernel parameters, displayed as the kernel command line.
#[derive(Default, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct KernelParams {
    pub params: Vec<Param>,
}

impl KernelParams {
    pub fn new(params: Vec<Param>) -> Self {
        KernelParams { params }
    }

    pub fn push(&mut self, item: Param) {
        self.params.push(item);
    }

    /// Copy all `items` to the end, keeping their order.
    pub fn append(&mut self, items: &[Param]) {
        self.params.extend_from_slice(items);
    }

    /// Check whether a parameter named `key` is present.
    pub fn contains(&self, key: &str) -> bool {
        self.params.iter().any(|p| p.key == key)
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Param> {
        self.params.iter()
    }
}

impl FromStr for KernelParams {
    type Err = anyhow::Error;

    fn from_str(cmdline: &str) -> Result<Self> {
        let params = cmdline
            .split_whitespace()
            .map(Param::from_str)
            .collect::<Result<Vec<Param>>>()?;
        Ok(KernelParams { params })
    }
}

impl From<&[Param]> for KernelParams {
    fn from(params: &[Param]) -> Self {
        KernelParams::new(params.to_vec())
    }
}

impl ConfigCheck for KernelParams {
    fn check(&self) -> Result<()> {
        for param in self.params.iter() {
            if param.key.len() > MAX_STRING_LENGTH || param.value.len() > MAX_STRING_LENGTH {
                return Err(anyhow!(ConfigError::StringLengthTooLong(
                    "kernel params".to_string(),
                    MAX_STRING_LENGTH,
                )));
            }
        }

        Ok(())
    }
}

impl fmt::Display for KernelParams {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let params: Vec<String> = self.params.iter().map(|p| p.to_string()).collect();
        write!(f, "{}", params.join(" "))
    }
}
