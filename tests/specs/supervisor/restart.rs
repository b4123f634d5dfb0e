//! Crash-restart and stop-versus-restart race specs.

use crate::prelude::*;
use serial_test::serial;

/// A plugin that dies shortly after starting is brought back by the
/// supervisor, with a fresh pid each time.
#[test]
#[serial]
fn crashed_plugin_is_restarted_with_a_new_pid() {
    let root = Root::new();
    root.start_plugin("flaky", "sleep 1");

    let mut pids = std::collections::HashSet::new();
    let deadline = std::time::Instant::now() + std::time::Duration::from_secs(12);
    while std::time::Instant::now() < deadline {
        if let Some(pid) = root.pid_of("flaky") {
            if root.status_of("flaky").as_deref() == Some("running") {
                pids.insert(pid);
            }
        }
        if pids.len() >= 3 {
            break;
        }
        std::thread::sleep(std::time::Duration::from_millis(100));
    }
    assert!(
        pids.len() >= 2,
        "expected at least two distinct pids across restarts, saw {pids:?}"
    );
}

/// Once stopped, a plugin stays stopped: the supervisor never flips it
/// back to running, however the stop raced an in-flight restart.
#[test]
#[serial]
fn stop_wins_the_race_against_restart() {
    let root = Root::new();
    root.start_plugin("racer", "sleep 1");

    // Stop immediately, while the supervisor may be mid-restart.
    root.passes(&["stop", "--plugin-id", "racer"]);

    let stopped = wait_for(11_000, || {
        root.status_of("racer").as_deref() == Some("stopped")
    });
    assert!(stopped, "plugin never converged to stopped");

    // Hold for several poll intervals: the marker forbids any restart.
    std::thread::sleep(std::time::Duration::from_millis(POLL_INTERVAL_MS * 5));
    assert_eq!(root.status_of("racer").as_deref(), Some("stopped"));
    assert!(root.path().join("state/racer/stop_requested").exists());
}
