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

use anyhow::{anyhow, Result};
use rand::rngs::OsRng;
use rand::RngCore;

use crate::UtilError;

/// Read `len` bytes from the os entropy source.
///
/// The bytes are only meant to make identifiers unique.
pub fn generate_random_bytes(len: usize) -> Result<Vec<u8>> {
    let mut bytes = vec![0_u8; len];
    OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(|e| anyhow!(UtilError::EntropyUnavailable(len, e.to_string())))?;
    Ok(bytes)
}
