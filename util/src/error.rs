// Copyright (c) 2022 Huawei Technologies Co.,Ltd. All rights reserved.
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

use thiserror::Error;

#[derive(Error, Debug)]
pub enum UtilError {
    // random submodule error
    #[error("Failed to read {0} random bytes from the os entropy source: {1}")]
    EntropyUnavailable(usize, String),
    // host submodule error
    #[error("Failed to read cpu info from {0}")]
    CpuInfoRead(String),
    #[error("No cpu flags found in {0}")]
    CpuFlagsMissing(String),
    // time submodule error
    #[error("Failed to get system time: {0}")]
    GetTime(String),
}
