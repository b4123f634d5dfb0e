//! Exit-code contract: 0 success, 1 operational error, 2 missing --root.

use crate::prelude::*;
use assert_cmd::Command;

fn stderr_of(output: &std::process::Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn missing_root_exits_2() {
    let output = Command::cargo_bin("warden")
        .unwrap()
        .arg("list")
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(stderr_of(&output).contains("must specify --root"));
}

#[test]
fn state_of_unknown_plugin_exits_1() {
    let root = Root::new();
    let output = root
        .warden()
        .args(["state", "--plugin-id", "ghost"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr_of(&output).contains("not found"));
}

#[test]
fn stop_of_unknown_plugin_exits_1() {
    let root = Root::new();
    let output = root
        .warden()
        .args(["stop", "--plugin-id", "ghost"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn run_without_config_on_process_backend_exits_1() {
    let root = Root::new();
    let work = root.work_dir("w");
    let output = root
        .warden()
        .args(["run", "--plugin-id", "p1", "--work-dir"])
        .arg(&work)
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr_of(&output).contains("--config"));
}

#[test]
fn run_with_unknown_backend_exits_1() {
    let root = Root::new();
    let work = root.work_dir("w");
    let output = root
        .warden()
        .args(["run", "--plugin-id", "p1", "--backend", "vm", "--work-dir"])
        .arg(&work)
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr_of(&output).contains("unknown backend"));
}

#[test]
fn log_of_unknown_plugin_exits_1() {
    let root = Root::new();
    let output = root
        .warden()
        .args(["log", "--plugin-id", "ghost"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
}
