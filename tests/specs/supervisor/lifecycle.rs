//! Happy-path lifecycle: run, observe, stop, delete.

use crate::prelude::*;

#[test]
fn run_observe_stop_delete() {
    let root = Root::new();
    root.start_plugin("p1", "exec sleep 30");

    // Registered and live: list shows it, state agrees with the record.
    let listed = wait_for(SPEC_WAIT_MAX_MS, || {
        let out = root.passes(&["list"]);
        out.contains("p1") && out.contains("running")
    });
    assert!(listed, "plugin never reported running");
    assert!(root.pid_of("p1").is_some_and(|pid| pid > 0));

    let state = root.passes(&["state", "--plugin-id", "p1"]);
    assert!(state.contains("plugin_id: p1"));
    assert!(state.contains("backend: process"));

    // Stop without removing: converges to stopped and stays registered.
    root.passes(&["stop", "--plugin-id", "p1"]);
    let stopped = wait_for(11_000, || {
        root.status_of("p1").as_deref() == Some("stopped")
    });
    assert!(stopped, "plugin did not stop within the grace window");
    assert!(root.passes(&["list"]).contains("p1"));

    // Delete removes every trace.
    root.passes(&["delete", "--plugin-id", "p1"]);
    assert!(root.status_of("p1").is_none(), "state should fail after delete");
    assert!(!root.path().join("state").join("p1").exists());
    let listed = root.passes(&["list"]);
    assert!(!listed.contains("p1"));
}

#[test]
fn stop_is_idempotent() {
    let root = Root::new();
    root.start_plugin("p2", "exec sleep 30");

    root.passes(&["stop", "--plugin-id", "p2"]);
    let stopped = wait_for(11_000, || {
        root.status_of("p2").as_deref() == Some("stopped")
    });
    assert!(stopped);

    // Stopping an already-stopped plugin still succeeds.
    root.passes(&["stop", "--plugin-id", "p2"]);
    root.passes(&["delete", "--plugin-id", "p2"]);
}

#[test]
fn injected_env_reaches_the_plugin_and_user_entries_override() {
    let root = Root::new();
    let script = root.script("env-dump.sh", "env\nexec sleep 30");
    let work = root.work_dir("env-work");
    root.warden()
        .args(["run", "--plugin-id", "env-spec", "--work-dir"])
        .arg(&work)
        .arg("--config")
        .arg(&script)
        .args([
            "--plugin-version",
            "2.0",
            "--env",
            "HOST_TYPE=custom-host, EXTRA=1",
        ])
        .assert()
        .success();

    let seen = wait_for(SPEC_WAIT_MAX_MS, || {
        root.warden()
            .args(["log", "--plugin-id", "env-spec"])
            .output()
            .map(|o| {
                let log = String::from_utf8_lossy(&o.stdout).into_owned();
                log.contains("EXTRA=1")
            })
            .unwrap_or(false)
    });
    assert!(seen, "plugin environment never reached the log");

    let log = root.passes(&["log", "--plugin-id", "env-spec"]);
    assert!(log.contains("PLUGIN_ID=env-spec"));
    assert!(log.contains("PLUGIN_VERSION=2.0"));
    assert!(log.contains("HOST_DIR=/"));
    // The user-supplied entry wins over the injected default.
    assert!(log.contains("HOST_TYPE=custom-host"));
}
