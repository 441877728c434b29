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

use std::path::Path;

use anyhow::{anyhow, Context, Result};
use log::info;

use crate::UtilError;

pub const PROC_CPUINFO: &str = "/proc/cpuinfo";

const CPU_FLAGS_TAG: &str = "flags";
const HYPERVISOR_FLAG: &str = "hypervisor";

/// Get the cpu flags listed on the first "flags" line of a cpuinfo file.
pub fn cpu_flags(cpuinfo: &Path) -> Result<Vec<String>> {
    let content = std::fs::read_to_string(cpuinfo)
        .with_context(|| UtilError::CpuInfoRead(cpuinfo.display().to_string()))?;

    for line in content.lines() {
        let (tag, flags) = match line.split_once(':') {
            Some(fields) => fields,
            None => continue,
        };
        if tag.trim() == CPU_FLAGS_TAG {
            return Ok(flags.split_whitespace().map(String::from).collect());
        }
    }

    Err(anyhow!(UtilError::CpuFlagsMissing(
        cpuinfo.display().to_string()
    )))
}

/// Whether the host is itself a guest of another hypervisor.
///
/// A cpuinfo without flags, as on POWER, can't tell and reports no
/// hypervisor.
pub fn running_on_vmm(cpuinfo: &Path) -> Result<bool> {
    let flags = match cpu_flags(cpuinfo) {
        Ok(flags) => flags,
        Err(e)
            if matches!(
                e.downcast_ref::<UtilError>(),
                Some(UtilError::CpuFlagsMissing(_))
            ) =>
        {
            info!(
                "No cpu flags in {}, assume not running on a hypervisor",
                cpuinfo.display()
            );
            return Ok(false);
        }
        Err(e) => return Err(e),
    };

    Ok(flags.iter().any(|f| f == HYPERVISOR_FLAG))
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn write_cpuinfo(path: &str, content: &str) {
        let mut file = std::fs::File::create(path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
    }

    #[test]
    fn test_running_on_vmm() {
        let path = "/tmp/qemu_arch_cpuinfo_nested";
        write_cpuinfo(
            path,
            "processor\t: 0\nvendor_id\t: GenuineIntel\nflags\t\t: fpu vme hypervisor lahf_lm\n",
        );
        assert!(running_on_vmm(Path::new(path)).unwrap());
        std::fs::remove_file(path).unwrap();

        let path = "/tmp/qemu_arch_cpuinfo_bare";
        write_cpuinfo(path, "processor\t: 0\nflags\t\t: fpu vme vmx lahf_lm\n");
        assert!(!running_on_vmm(Path::new(path)).unwrap());
        std::fs::remove_file(path).unwrap();
    }

    #[test]
    fn test_running_on_vmm_power() {
        let path = "/tmp/qemu_arch_cpuinfo_power";
        write_cpuinfo(
            path,
            "processor\t: 0\ncpu\t\t: POWER9 (architected), altivec supported\n\
             clock\t\t: 2200.000000MHz\nrevision\t: 2.2 (pvr 004e 1202)\n\n\
             timebase\t: 512000000\nplatform\t: pSeries\nmodel\t\t: IBM pSeries (emulated by qemu)\n",
        );
        assert!(!running_on_vmm(Path::new(path)).unwrap());
        std::fs::remove_file(path).unwrap();
    }

    #[test]
    fn test_cpu_flags_missing() {
        let path = "/tmp/qemu_arch_cpuinfo_noflags";
        write_cpuinfo(path, "processor\t: 0\ncpu\t\t: POWER9 (architected)\n");
        let err = cpu_flags(Path::new(path)).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<UtilError>(),
            Some(UtilError::CpuFlagsMissing(_))
        ));
        assert!(!running_on_vmm(Path::new(path)).unwrap());
        std::fs::remove_file(path).unwrap();

        assert!(running_on_vmm(Path::new("/tmp/qemu_arch_no_such_cpuinfo")).is_err());
    }
}
