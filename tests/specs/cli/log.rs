//! Log streaming specs: passthrough and tail.

use crate::prelude::*;

#[test]
fn plugin_output_streams_through_log() {
    let root = Root::new();
    root.start_plugin("greeter", "echo hello\nexec sleep 30");

    let seen = wait_for(SPEC_WAIT_MAX_MS, || {
        root.warden()
            .args(["log", "--plugin-id", "greeter"])
            .output()
            .map(|o| String::from_utf8_lossy(&o.stdout).contains("hello"))
            .unwrap_or(false)
    });
    assert!(seen, "plugin stdout never reached the log stream");

    root.passes(&["stop", "--plugin-id", "greeter"]);
}

#[test]
fn length_returns_only_the_trailing_lines() {
    let root = Root::new();
    root.start_plugin(
        "chatty",
        "echo first\necho second\necho third\nexec sleep 30",
    );

    let seen = wait_for(SPEC_WAIT_MAX_MS, || {
        root.warden()
            .args(["log", "--plugin-id", "chatty"])
            .output()
            .map(|o| String::from_utf8_lossy(&o.stdout).contains("third"))
            .unwrap_or(false)
    });
    assert!(seen);

    let tail = root.passes(&["log", "--plugin-id", "chatty", "--length", "2"]);
    assert!(!tail.contains("first"));
    assert!(tail.contains("second"));
    assert!(tail.contains("third"));

    root.passes(&["stop", "--plugin-id", "chatty"]);
}
