//! List and state output formats.

use crate::prelude::*;

#[test]
fn empty_root_lists_nothing() {
    let root = Root::new();
    assert!(root.passes(&["list"]).trim().is_empty());

    let json = root.passes(&["list", "--format", "json"]);
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value, serde_json::json!([]));
}

#[test]
fn json_list_carries_the_instance_fields() {
    let root = Root::new();
    root.start_plugin("listed", "exec sleep 30");

    let running = wait_for(SPEC_WAIT_MAX_MS, || {
        root.status_of("listed").as_deref() == Some("running")
    });
    assert!(running);

    let json = root.passes(&["list", "--format", "json"]);
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    let items = value.as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["plugin_id"], "listed");
    assert_eq!(items[0]["backend"], "process");
    assert_eq!(items[0]["status"], "running");
    assert!(items[0]["pid"].as_u64().is_some_and(|pid| pid > 0));

    root.passes(&["stop", "--plugin-id", "listed"]);
}

#[test]
fn json_state_matches_the_meta_record() {
    let root = Root::new();
    root.start_plugin("stately", "exec sleep 30");

    let json = root.passes(&["state", "--plugin-id", "stately", "--format", "json"]);
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["plugin_id"], "stately");
    assert_eq!(value["backend"], "process");
    assert!(value["runtime_pid"].as_u64().is_some_and(|pid| pid > 0));
    assert!(value["work_dir"].as_str().is_some());

    root.passes(&["stop", "--plugin-id", "stately"]);
}
