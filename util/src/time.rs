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
use nix::time::{clock_gettime, ClockId};

use crate::UtilError;

/// Get the realtime clock as (seconds, nanoseconds).
pub fn gettime() -> Result<(i64, i64)> {
    let ts = clock_gettime(ClockId::CLOCK_REALTIME)
        .map_err(|e| anyhow!(UtilError::GetTime(e.to_string())))?;
    Ok((ts.tv_sec() as i64, ts.tv_nsec() as i64))
}

/// Split seconds since epoch into local [year, month, day, hour, minute, second].
pub fn get_format_time(sec: i64) -> [i32; 6] {
    let sec = sec as libc::time_t;
    // SAFETY: `tm` is a plain C struct which is fully written by localtime_r,
    // and both pointers are valid for the duration of the call.
    let tm = unsafe {
        let mut tm: libc::tm = std::mem::zeroed();
        libc::localtime_r(&sec, &mut tm);
        tm
    };

    [
        tm.tm_year + 1900,
        tm.tm_mon + 1,
        tm.tm_mday,
        tm.tm_hour,
        tm.tm_min,
        tm.tm_sec,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_format_time() {
        let time = get_format_time(0);
        // Local time zone shifts the epoch by less than one day.
        assert!(time[0] == 1969 || time[0] == 1970);
        assert!(time[1] >= 1 && time[1] <= 12);
        assert!(time[2] >= 1 && time[2] <= 31);
        assert!(time[3] >= 0 && time[3] < 24);
    }

    #[test]
    fn test_gettime() {
        let (sec, nsec) = gettime().unwrap();
        assert!(sec > 0);
        assert!(nsec >= 0 && nsec < 1_000_000_000);
    }
}
