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

use mod_test::libdriver::launch::TestLaunchConfig;
use mod_test::utils::{cleanup_dir, create_img, get_tmp_dir};
use qemu_arch::config::{Device, HypervisorConfig};
use qemu_arch::{new_qemu_arch, MachineError};

const BRIDGE_COUNT: u32 = 2;
const HOST_MEMORY_MB: u64 = 16384;

fn hypervisor_config(json: &str) -> HypervisorConfig {
    let value = serde_json::from_str(json).unwrap();
    HypervisorConfig::from_value(&value).unwrap()
}

#[test]
fn test_ppc64le_launch_config() {
    let config = hypervisor_config(
        r#"
        {
            "kernel_params": "init=/usr/lib/systemd/systemd",
            "default_vcpus": 2,
            "default_max_vcpus": 4,
            "memory_size_mb": 1024,
            "disable_nesting_checks": true
        }
        "#,
    );
    let mut arch = new_qemu_arch("ppc64le", &config).unwrap();
    arch.setup_nesting(&config);
    let dir = get_tmp_dir();
    let image = create_img(&dir, 4096);

    let launch =
        TestLaunchConfig::assemble(arch.as_ref(), &config, BRIDGE_COUNT, &image, HOST_MEMORY_MB)
            .unwrap();
    assert_eq!(launch.machine_type, "pseries");
    assert_eq!(launch.machine_options, "accel=kvm,usb=off");
    assert_eq!(launch.qemu_path, "/usr/libexec/qemu-kvm");
    assert_eq!(launch.cpu_model, "host");
    assert_eq!(launch.smp.cpus, 2);
    assert_eq!(launch.smp.max_cpus, 4);
    assert_eq!(launch.memory.size, "1024M");
    assert!(launch.memory.slots.is_none());
    assert!(launch.memory.max_mem.is_none());
    assert!(launch.capabilities.is_block_device_hotplug_supported());

    let cmdline = launch.kernel_params.to_string();
    assert!(cmdline.starts_with("tsc=reliable no_timer_check"));
    assert!(cmdline.ends_with("quiet systemd.show_status=false init=/usr/lib/systemd/systemd"));

    let ids: Vec<&str> = launch.devices.iter().map(|d| d.id()).collect();
    assert_eq!(ids.len(), 5);
    assert_eq!(
        &ids[..4],
        &["pci-bridge-0", "pci-bridge-1", "serial0", "console0"]
    );
    match &launch.devices[4] {
        Device::Block(blk) => {
            assert!(blk.id.starts_with("image-"));
            assert_eq!(blk.file, image);
        }
        dev => panic!("Expect a block device, found {:?}", dev),
    }

    cleanup_dir(&dir);
}

#[test]
fn test_ppc64le_launch_config_many_vcpus() {
    let config = hypervisor_config(
        r#"
        {
            "hypervisor_path": "/opt/qemu/bin/qemu-system-ppc64",
            "default_vcpus": 200,
            "default_max_vcpus": 255,
            "debug": true,
            "disable_nesting_checks": true
        }
        "#,
    );
    let mut arch = new_qemu_arch("ppc64le", &config).unwrap();
    arch.setup_nesting(&config);
    let dir = get_tmp_dir();
    let image = create_img(&dir, 0);

    let launch =
        TestLaunchConfig::assemble(arch.as_ref(), &config, 0, &image, HOST_MEMORY_MB).unwrap();
    assert_eq!(launch.qemu_path, "/opt/qemu/bin/qemu-system-ppc64");
    assert_eq!(launch.smp.cpus, 128);
    assert_eq!(launch.smp.max_cpus, 128);
    assert!(launch
        .kernel_params
        .to_string()
        .ends_with("debug systemd.show_status=true systemd.log_level=debug"));
    assert_eq!(launch.devices.len(), 3);

    cleanup_dir(&dir);
}

#[test]
fn test_ppc64le_unknown_machine_type() {
    let config = HypervisorConfig {
        machine_type: "powernv".to_string(),
        ..Default::default()
    };
    let arch = new_qemu_arch("ppc64le", &config).unwrap();

    assert!(arch.capabilities().is_empty());
    assert!(arch.bridges(4).is_empty());
    assert!(arch.append_bridges(Vec::new(), &arch.bridges(4)).is_empty());

    let err = TestLaunchConfig::assemble(
        arch.as_ref(),
        &config,
        BRIDGE_COUNT,
        "/tmp/qemu_arch_unknown_machine.img",
        HOST_MEMORY_MB,
    )
    .err()
    .unwrap();
    assert!(matches!(
        err.downcast_ref::<MachineError>(),
        Some(MachineError::UnrecognisedMachineType(_))
    ));
}
