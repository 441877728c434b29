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

use thiserror::Error;

#[derive(Error, Debug)]
pub enum MachineError {
    #[error("Unsupported host architecture {0}")]
    UnsupportedArch(String),
    #[error("Unrecognised machine type: {0}")]
    UnrecognisedMachineType(String),
    #[error("Unknown machine type: {0}, no qemu path for it")]
    UnknownMachineType(String),
    #[error("Image {0} does not exist")]
    ImageNotFound(String),
    #[error("Failed to get metadata of image {0}")]
    ImageMetadata(String),
    #[error("Failed to generate a random id for image {0}")]
    EntropyUnavailable(String),
}
