//! Shared helpers for the binary-driving specs.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use assert_cmd::Command;
use tempfile::TempDir;

/// Generous ceiling for poll loops; individual checks converge much sooner.
pub const SPEC_WAIT_MAX_MS: u64 = 15_000;

/// Fast supervisor poll interval used by every spec, so restart behavior
/// is observable without three-second waits.
pub const POLL_INTERVAL_MS: u64 = 300;

/// One runtime root under a temp dir, plus work dirs and plugin scripts.
pub struct Root {
    dir: TempDir,
}

impl Root {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// A `warden` invocation pointed at this root.
    pub fn warden(&self) -> Command {
        let mut cmd = Command::cargo_bin("warden").unwrap();
        cmd.arg("--root").arg(self.dir.path());
        cmd.env("WARDEN_POLL_INTERVAL_MS", POLL_INTERVAL_MS.to_string());
        cmd.timeout(Duration::from_secs(30));
        cmd
    }

    /// stdout of an invocation that must succeed.
    pub fn passes(&self, args: &[&str]) -> String {
        let assert = self.warden().args(args).assert().success();
        String::from_utf8(assert.get_output().stdout.clone()).unwrap()
    }

    /// Create a work dir for a plugin.
    pub fn work_dir(&self, name: &str) -> PathBuf {
        let dir = self.dir.path().join(name);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    /// Write an executable shell script and return its path.
    pub fn script(&self, name: &str, body: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;
        let path = self.dir.path().join(name);
        std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    /// Start a process-backend plugin running `script_body` and wait for it
    /// to be listed as running.
    pub fn start_plugin(&self, plugin_id: &str, script_body: &str) {
        let script = self.script(&format!("{plugin_id}.sh"), script_body);
        let work = self.work_dir(&format!("{plugin_id}-work"));
        self.warden()
            .args(["run", "--plugin-id", plugin_id, "--work-dir"])
            .arg(&work)
            .arg("--config")
            .arg(&script)
            .assert()
            .success();
        let running = wait_for(SPEC_WAIT_MAX_MS, || {
            self.passes(&["list"]).contains(plugin_id)
        });
        assert!(running, "plugin {plugin_id} never appeared in list");
    }

    /// The status column reported by `state` for a plugin, or None when
    /// the command fails (e.g. after delete).
    pub fn status_of(&self, plugin_id: &str) -> Option<String> {
        let output = self
            .warden()
            .args(["state", "--plugin-id", plugin_id, "--format", "json"])
            .output()
            .unwrap();
        if !output.status.success() {
            return None;
        }
        let value: serde_json::Value = serde_json::from_slice(&output.stdout).ok()?;
        value["status"].as_str().map(str::to_string)
    }

    /// The pid reported by `state`, when running.
    pub fn pid_of(&self, plugin_id: &str) -> Option<u64> {
        let output = self
            .warden()
            .args(["state", "--plugin-id", plugin_id, "--format", "json"])
            .output()
            .unwrap();
        if !output.status.success() {
            return None;
        }
        let value: serde_json::Value = serde_json::from_slice(&output.stdout).ok()?;
        value["pid"].as_u64()
    }
}

impl Drop for Root {
    fn drop(&mut self) {
        // Supervisors outlive the CLI; stop everything first so each one
        // observes its stop marker and exits, then remove the remains.
        let state_dir = self.dir.path().join("state");
        if let Ok(entries) = std::fs::read_dir(&state_dir) {
            for entry in entries.flatten() {
                let plugin_id = entry.file_name().to_string_lossy().into_owned();
                let _ = self
                    .warden()
                    .args(["stop", "--plugin-id", &plugin_id])
                    .ok();
            }
            std::thread::sleep(Duration::from_millis(POLL_INTERVAL_MS * 3));
        }
        let _ = self.warden().arg("destroy").ok();
    }
}

/// Poll `check` until it passes or `max_ms` elapses.
pub fn wait_for(max_ms: u64, mut check: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_millis(max_ms);
    while Instant::now() < deadline {
        if check() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(100));
    }
    false
}
