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

use rand::distributions::Alphanumeric;
use rand::{thread_rng, Rng};
use std::fs;

pub fn get_rand_str(size: usize) -> String {
    thread_rng()
        .sample_iter(&Alphanumeric)
        .take(size)
        .map(char::from)
        .collect()
}

pub fn get_tmp_dir() -> String {
    let dir_name = format!("/tmp/qemu-arch-test-{}", get_rand_str(10));
    fs::create_dir(&dir_name).unwrap();
    dir_name
}

/// Create an empty guest image of `size` bytes in `dir`.
pub fn create_img(dir: &str, size: u64) -> String {
    let path = format!("{}/rootfs.img", dir);
    let file = fs::File::create(&path).unwrap();
    file.set_len(size).unwrap();
    path
}

pub fn cleanup_dir(dir: &str) {
    fs::remove_dir_all(dir).unwrap();
}
