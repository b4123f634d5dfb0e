// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Bare-process backend: plugins run as direct host children with stdio
//! tied to the unified log file.
//!
//! Children of this supervisor are tracked in an in-memory table for
//! precise stop semantics; plugins owned by a different supervisor process
//! are reached through the pid file with a best-effort signal. Both paths
//! converge at "child exited and table entry removed".

use std::collections::HashMap;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use nix::sys::signal::{kill, Signal};
use nix::unistd::Pid;
use parking_lot::Mutex;
use tokio::sync::watch;

use warden_core::{
    BackendKind, InstanceInfo, LogOptions, Meta, RunOptions, RuntimeError, StateInfo,
    STATUS_RUNNING, STATUS_STOPPED,
};
use warden_state::StateStore;

use crate::{logs, LogStream, PluginBackend};

#[cfg(test)]
#[path = "process_tests.rs"]
mod tests;

/// Grace period between SIGTERM and SIGKILL on stop.
const STOP_GRACE: Duration = Duration::from_secs(10);

/// Handle to a child spawned by this supervisor process.
struct ChildEntry {
    pid: u32,
    /// Flipped to true by the reaper task once the child has been reaped.
    exited: watch::Receiver<bool>,
}

/// Runs plugins as bare host processes.
///
/// Resource quotas are accepted but not enforced on this backend.
#[derive(Clone)]
pub struct ProcessBackend {
    store: StateStore,
    running: Arc<Mutex<HashMap<String, ChildEntry>>>,
}

impl ProcessBackend {
    pub fn new(store: StateStore) -> Self {
        Self {
            store,
            running: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Drop the in-memory record for a plugin (supervisor exit path).
    pub fn unregister(&self, plugin_id: &str) {
        self.running.lock().remove(plugin_id);
    }

    /// Signal-0 liveness probe.
    fn probe(pid: u32) -> bool {
        kill(Pid::from_raw(pid as i32), None).is_ok()
    }

    fn recorded_pid(&self, plugin_id: &str) -> Option<u32> {
        self.store
            .read_pid(plugin_id)
            .ok()
            .flatten()
            .filter(|pid| *pid > 0)
    }

    fn instance_info(&self, meta: &Meta) -> InstanceInfo {
        let pid = self.recorded_pid(&meta.plugin_id);
        let status = if pid.is_some_and(Self::probe) {
            STATUS_RUNNING
        } else {
            STATUS_STOPPED
        };
        InstanceInfo {
            plugin_id: meta.plugin_id.clone(),
            backend: BackendKind::Process,
            status: status.to_string(),
            pid,
            work_dir: meta.work_dir.clone(),
        }
    }
}

#[async_trait]
impl PluginBackend for ProcessBackend {
    async fn run(&self, opts: RunOptions) -> Result<(), RuntimeError> {
        if opts.plugin_id.is_empty() || opts.work_dir.as_os_str().is_empty() || opts.config.is_empty()
        {
            return Err(RuntimeError::InvalidArgument(
                "plugin_id, work_dir and config are required".to_string(),
            ));
        }
        let stdout = logs::open_log_file(&self.store, &opts.plugin_id)?;
        let stderr = stdout.try_clone()?;

        let mut cmd = tokio::process::Command::new(&opts.config);
        cmd.current_dir(&opts.work_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::from(stdout))
            .stderr(Stdio::from(stderr));
        // The host environment is inherited. Injected variables go first so
        // the caller's entries can override them.
        cmd.env("PLUGIN_ID", &opts.plugin_id)
            .env("PLUGIN_VERSION", &opts.plugin_version)
            .env("DEVICE_ID", &opts.device_id)
            .env("HOST_TYPE", &opts.host_type)
            .env("HOST_NAME", &opts.host_name)
            // No filesystem isolation on this backend.
            .env("HOST_DIR", "/");
        for (key, value) in opts.env.iter().filter_map(|kv| kv.split_once('=')) {
            cmd.env(key, value);
        }

        let mut child = cmd
            .spawn()
            .map_err(|e| RuntimeError::Launch(format!("spawn {}: {e}", opts.config)))?;
        let Some(pid) = child.id() else {
            return Err(RuntimeError::Launch(format!(
                "{} exited before it could be tracked",
                opts.config
            )));
        };
        if let Err(e) = self.store.write_pid(&opts.plugin_id, pid) {
            let _ = child.kill().await;
            return Err(e.into());
        }

        let (exit_tx, exit_rx) = watch::channel(false);
        self.running.lock().insert(
            opts.plugin_id.clone(),
            ChildEntry {
                pid,
                exited: exit_rx,
            },
        );

        // Reaper: wait on the child so it never lingers as a zombie (which
        // would satisfy the signal-0 probe and mask a crash), then clear
        // the table entry unless a newer incarnation replaced it.
        let running = Arc::clone(&self.running);
        let plugin_id = opts.plugin_id.clone();
        tokio::spawn(async move {
            match child.wait().await {
                Ok(status) => {
                    tracing::info!(plugin_id = %plugin_id, pid, status = %status, "plugin process exited");
                }
                Err(e) => {
                    tracing::warn!(plugin_id = %plugin_id, pid, error = %e, "failed to wait on plugin process");
                }
            }
            {
                let mut table = running.lock();
                if table.get(&plugin_id).is_some_and(|entry| entry.pid == pid) {
                    table.remove(&plugin_id);
                }
            }
            let _ = exit_tx.send(true);
        });

        tracing::info!(plugin_id = %opts.plugin_id, pid, config = %opts.config, "plugin process started");
        Ok(())
    }

    async fn stop(&self, plugin_id: &str) -> Result<(), RuntimeError> {
        let entry = self.running.lock().remove(plugin_id);
        if let Some(mut entry) = entry {
            let _ = kill(Pid::from_raw(entry.pid as i32), Signal::SIGTERM);
            let wait_exit = async {
                while !*entry.exited.borrow_and_update() {
                    if entry.exited.changed().await.is_err() {
                        break;
                    }
                }
            };
            if tokio::time::timeout(STOP_GRACE, wait_exit).await.is_err() {
                tracing::warn!(plugin_id, pid = entry.pid, "grace period expired, killing");
                let _ = kill(Pid::from_raw(entry.pid as i32), Signal::SIGKILL);
            }
            return Ok(());
        }
        // Possibly supervised by another process: best-effort SIGTERM via
        // the pid file, no wait.
        if let Some(pid) = self.recorded_pid(plugin_id) {
            let _ = kill(Pid::from_raw(pid as i32), Signal::SIGTERM);
        }
        Ok(())
    }

    async fn delete(&self, plugin_id: &str) -> Result<(), RuntimeError> {
        if let Err(e) = self.stop(plugin_id).await {
            tracing::warn!(plugin_id, error = %e, "stop during delete failed");
        }
        if let Ok(meta) = self.store.load_meta(plugin_id) {
            if !meta.work_dir.as_os_str().is_empty() {
                if let Err(e) = std::fs::remove_dir_all(&meta.work_dir) {
                    if e.kind() != std::io::ErrorKind::NotFound {
                        tracing::warn!(plugin_id, error = %e, "failed to remove work dir");
                    }
                }
            }
        }
        self.store.remove(plugin_id)?;
        Ok(())
    }

    async fn state(&self, plugin_id: &str) -> Result<StateInfo, RuntimeError> {
        let meta = self.store.load_meta(plugin_id)?;
        if meta.backend != BackendKind::Process {
            return Err(RuntimeError::BackendMismatch {
                plugin_id: plugin_id.to_string(),
                expected: BackendKind::Process,
                actual: meta.backend,
            });
        }
        let pid = self.recorded_pid(plugin_id);
        let status = if pid.is_some_and(Self::probe) {
            STATUS_RUNNING
        } else {
            STATUS_STOPPED
        };
        Ok(StateInfo {
            plugin_id: plugin_id.to_string(),
            backend: BackendKind::Process,
            status: status.to_string(),
            pid,
            runtime_pid: meta.runtime_pid,
            work_dir: meta.work_dir,
        })
    }

    async fn list(&self) -> Result<Vec<InstanceInfo>, RuntimeError> {
        let ids = self.store.list_plugin_ids()?;
        let mut out = Vec::new();
        for id in ids {
            let Ok(meta) = self.store.load_meta(&id) else {
                continue;
            };
            if meta.backend != BackendKind::Process {
                continue;
            }
            out.push(self.instance_info(&meta));
        }
        Ok(out)
    }

    async fn log(&self, plugin_id: &str, opts: LogOptions) -> Result<LogStream, RuntimeError> {
        logs::read_log(&self.store, plugin_id, opts).await
    }
}
