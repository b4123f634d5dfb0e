//! Destroy-everything spec.

use crate::prelude::*;

#[test]
fn destroy_removes_every_plugin_and_its_state() {
    let root = Root::new();
    root.start_plugin("p5a", "exec sleep 30");
    root.start_plugin("p5b", "exec sleep 30");

    root.passes(&["destroy"]);

    let empty = wait_for(SPEC_WAIT_MAX_MS, || {
        root.passes(&["list"]).trim().is_empty()
    });
    assert!(empty, "list should be empty after destroy");
    assert!(!root.path().join("state").join("p5a").exists());
    assert!(!root.path().join("state").join("p5b").exists());
}
