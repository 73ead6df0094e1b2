//! Contract Tests for Launch Plans
//!
//! These tests pin the exact command lines handed to the OS, since the
//! container runtime and the installer both parse them positionally.

use installer_harness::launcher::{LaunchMode, LaunchPlan};
use installer_harness::{ContainerConfig, SessionConfig};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

fn work_dir() -> &'static Path {
    Path::new("/tmp/installer-harness-abc")
}

#[test]
fn test_container_argv_layout() {
    let config = SessionConfig::new("/opt/keitaro/install.sh")
        .with_args("-L en -S")
        .with_env("SKIP_CHECKS", 1)
        .with_env("DEBUG", "true")
        .with_container(ContainerConfig::new("centos:7", "keitaro_installer_test"));

    let plan = LaunchPlan::for_session(&config, work_dir()).unwrap();

    assert_eq!(plan.mode, LaunchMode::Container);
    assert_eq!(plan.program, PathBuf::from("docker"));
    assert_eq!(
        plan.args,
        vec![
            "run",
            "-e",
            "DEBUG=true",
            "-e",
            "SKIP_CHECKS=1",
            "--name",
            "keitaro_installer_test",
            "-i",
            "--rm",
            "-v",
            "/tmp/installer-harness-abc:/data",
            "-w",
            "/data",
            "centos:7",
            "./install.sh",
            "-L",
            "en",
            "-S",
        ]
    );
    // Variables reach the container through -e flags only
    assert!(plan.env.is_empty());
    assert_eq!(plan.cwd, work_dir());
}

#[test]
fn test_container_runtime_and_mount_point_are_configurable() {
    let container = ContainerConfig::new("alpine:3", "probe")
        .with_runtime("podman")
        .with_mount_point("/work");
    let config = SessionConfig::new("setup").with_container(container);

    let plan = LaunchPlan::for_session(&config, work_dir()).unwrap();
    assert_eq!(
        plan.command_line(),
        "podman run --name probe -i --rm -v /tmp/installer-harness-abc:/work -w /work alpine:3 ./setup"
    );
}

#[test]
fn test_native_plan_runs_copy_in_working_dir() {
    let config = SessionConfig::new("scripts/install.sh")
        .with_args("  --yes   --quiet ")
        .with_env("LANG", "C");

    let plan = LaunchPlan::for_session(&config, work_dir()).unwrap();

    assert_eq!(plan.mode, LaunchMode::Native);
    assert_eq!(plan.program, work_dir().join("install.sh"));
    assert_eq!(plan.args, vec!["--yes", "--quiet"]);
    assert_eq!(
        plan.env,
        BTreeMap::from([("LANG".to_string(), "C".to_string())])
    );
    assert_eq!(plan.cwd, work_dir());
    assert_eq!(
        plan.command_line(),
        "/tmp/installer-harness-abc/install.sh --yes --quiet"
    );
}

#[test]
fn test_quoted_args_stay_single_entries() {
    let config = SessionConfig::new("install.sh")
        .with_args("--name 'a b' -S")
        .with_container(ContainerConfig::new("centos:7", "quoted"));

    let plan = LaunchPlan::for_session(&config, work_dir()).unwrap();
    assert_eq!(&plan.args[plan.args.len() - 4..], ["./install.sh", "--name", "a b", "-S"]);
}

#[test]
fn test_unbalanced_quotes_are_rejected() {
    let config = SessionConfig::new("install.sh").with_args("--name \"a b");
    assert!(matches!(
        LaunchPlan::for_session(&config, work_dir()),
        Err(installer_harness::Error::Config(_))
    ));
}

#[test]
fn test_empty_args_produce_no_argv() {
    let config = SessionConfig::new("install.sh");
    let plan = LaunchPlan::for_session(&config, work_dir()).unwrap();
    assert!(plan.args.is_empty());
}

#[test]
fn test_installer_without_file_name_is_rejected() {
    let config = SessionConfig::new("/");
    assert!(matches!(
        LaunchPlan::for_session(&config, work_dir()),
        Err(installer_harness::Error::Config(_))
    ));
}

#[test]
fn test_unique_container_names() {
    let a = ContainerConfig::with_unique_name("alpine:3");
    let b = ContainerConfig::with_unique_name("alpine:3");
    assert_ne!(a.name, b.name);
    assert!(a.name.starts_with("installer-harness-"));
}
