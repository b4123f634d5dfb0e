// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! OCI-container backend: delegates to an external low-level runtime
//! invoked as `<runtime> <verb> <container_id>` with the bundle directory
//! as the working directory.
//!
//! The bundle itself (rootfs, config.json) is prepared externally; this
//! backend only launches, signals, queries, and deletes through the
//! runtime binary and joins container output to the unified log.

use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use warden_core::{
    cpu_shares, mem_bytes, BackendKind, InstanceInfo, LogOptions, RunOptions, RuntimeError,
    StateInfo, STATUS_RUNNING, STATUS_STOPPED,
};
use warden_state::StateStore;

use crate::{logs, LogStream, PluginBackend};

#[cfg(test)]
#[path = "container_tests.rs"]
mod tests;

/// How long run waits for the runtime to publish a definite state before
/// handing off to the supervisor loop.
const READY_DEADLINE: Duration = Duration::from_secs(2);
const READY_POLL: Duration = Duration::from_millis(100);

/// Partial shape of `<runtime> state <id>` output. The schema is a
/// compatibility surface: unknown fields are ignored and missing fields
/// default, so drift degrades to "stopped" instead of an error.
#[derive(Debug, Default, Deserialize)]
struct RuntimeState {
    #[serde(default)]
    pid: u32,
    #[serde(default)]
    status: String,
}

impl RuntimeState {
    /// Project onto the unified (status, pid) view. An empty status string
    /// is reported as running.
    fn view(self) -> (String, Option<u32>) {
        let status = self.status.to_lowercase();
        let status = if status.is_empty() {
            STATUS_RUNNING.to_string()
        } else {
            status
        };
        let pid = (self.pid > 0).then_some(self.pid);
        (status, pid)
    }
}

/// Runs plugins as OCI containers through an external runtime binary.
#[derive(Clone)]
pub struct ContainerBackend {
    store: StateStore,
    runtime_bin: String,
}

impl ContainerBackend {
    /// `runtime_bin` is resolved through `PATH` when not absolute; an
    /// empty string selects the default `runc`.
    pub fn new(store: StateStore, runtime_bin: impl Into<String>) -> Self {
        let mut runtime_bin = runtime_bin.into();
        if runtime_bin.is_empty() {
            runtime_bin = "runc".to_string();
        }
        Self { store, runtime_bin }
    }

    async fn runtime_state(
        &self,
        plugin_id: &str,
        bundle: &Path,
    ) -> Result<RuntimeState, RuntimeError> {
        let output = tokio::process::Command::new(&self.runtime_bin)
            .arg("state")
            .arg(plugin_id)
            .current_dir(bundle)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| {
                RuntimeError::ExternalRuntime(format!("invoke {} state: {e}", self.runtime_bin))
            })?;
        if !output.status.success() {
            return Err(RuntimeError::ExternalRuntime(format!(
                "{} state {plugin_id}: {}",
                self.runtime_bin, output.status
            )));
        }
        serde_json::from_slice(&output.stdout).map_err(|e| {
            RuntimeError::ExternalRuntime(format!(
                "parse {} state output: {e}",
                self.runtime_bin
            ))
        })
    }

    /// (status, pid) for one plugin, mapping any query failure to stopped.
    async fn observed_state(&self, plugin_id: &str, bundle: &Path) -> (String, Option<u32>) {
        match self.runtime_state(plugin_id, bundle).await {
            Ok(state) => state.view(),
            Err(e) => {
                tracing::debug!(plugin_id, error = %e, "container state query failed");
                (STATUS_STOPPED.to_string(), None)
            }
        }
    }
}

#[async_trait]
impl PluginBackend for ContainerBackend {
    async fn run(&self, opts: RunOptions) -> Result<(), RuntimeError> {
        if opts.plugin_id.is_empty() || opts.work_dir.as_os_str().is_empty() {
            return Err(RuntimeError::InvalidArgument(
                "plugin_id and work_dir (bundle path) are required".to_string(),
            ));
        }
        let stdout = logs::open_log_file(&self.store, &opts.plugin_id)?;
        let stderr = stdout.try_clone()?;

        let mut cmd = tokio::process::Command::new(&self.runtime_bin);
        cmd.arg("run")
            .arg(&opts.plugin_id)
            .current_dir(&opts.work_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::from(stdout))
            .stderr(Stdio::from(stderr));
        // A non-empty env replaces the inherited environment wholesale; what
        // the container itself sees is owned by the bundle's config.json.
        if !opts.env.is_empty() {
            cmd.env_clear();
            for (key, value) in opts.env.iter().filter_map(|kv| kv.split_once('=')) {
                cmd.env(key, value);
            }
        }

        let mut child = cmd.spawn().map_err(|e| {
            RuntimeError::Launch(format!("spawn {} run: {e}", self.runtime_bin))
        })?;

        let runtime_bin = self.runtime_bin.clone();
        let plugin_id = opts.plugin_id.clone();
        tokio::spawn(async move {
            match child.wait().await {
                Ok(status) => {
                    tracing::info!(plugin_id = %plugin_id, status = %status, "container runtime exited");
                }
                Err(e) => {
                    tracing::warn!(plugin_id = %plugin_id, runtime = %runtime_bin, error = %e, "failed to wait on container runtime");
                }
            }
        });

        tracing::info!(
            plugin_id = %opts.plugin_id,
            bundle = %opts.work_dir.display(),
            cpu_shares = cpu_shares(&opts.cpu),
            memory_bytes = mem_bytes(&opts.mem),
            "container launched"
        );

        // Wait for the runtime to publish a definite state so the
        // supervisor's first liveness check does not race it. Deadline
        // expiry is not an error; the loop remains the source of truth.
        let deadline = tokio::time::Instant::now() + READY_DEADLINE;
        while self
            .runtime_state(&opts.plugin_id, &opts.work_dir)
            .await
            .is_err()
        {
            if tokio::time::Instant::now() >= deadline {
                tracing::debug!(plugin_id = %opts.plugin_id, "no definite container state before deadline");
                break;
            }
            tokio::time::sleep(READY_POLL).await;
        }
        Ok(())
    }

    async fn stop(&self, plugin_id: &str) -> Result<(), RuntimeError> {
        let meta = self.store.load_meta(plugin_id)?;
        let result = tokio::process::Command::new(&self.runtime_bin)
            .arg("delete")
            .arg("--force")
            .arg(plugin_id)
            .current_dir(&meta.work_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await;
        // Failures are swallowed; the liveness probe is the source of truth.
        match result {
            Ok(status) if !status.success() => {
                tracing::debug!(plugin_id, status = %status, "container delete returned non-zero");
            }
            Err(e) => {
                tracing::warn!(plugin_id, error = %e, "container delete failed");
            }
            Ok(_) => {}
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
                        tracing::warn!(plugin_id, error = %e, "failed to remove bundle dir");
                    }
                }
            }
        }
        self.store.remove(plugin_id)?;
        Ok(())
    }

    async fn state(&self, plugin_id: &str) -> Result<StateInfo, RuntimeError> {
        let meta = self.store.load_meta(plugin_id)?;
        if meta.backend != BackendKind::Container {
            return Err(RuntimeError::BackendMismatch {
                plugin_id: plugin_id.to_string(),
                expected: BackendKind::Container,
                actual: meta.backend,
            });
        }
        let (status, pid) = self.observed_state(plugin_id, &meta.work_dir).await;
        Ok(StateInfo {
            plugin_id: plugin_id.to_string(),
            backend: BackendKind::Container,
            status,
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
            if meta.backend != BackendKind::Container {
                continue;
            }
            let (status, pid) = self.observed_state(&id, &meta.work_dir).await;
            out.push(InstanceInfo {
                plugin_id: id,
                backend: BackendKind::Container,
                status,
                pid,
                work_dir: meta.work_dir,
            });
        }
        Ok(out)
    }

    async fn log(&self, plugin_id: &str, opts: LogOptions) -> Result<LogStream, RuntimeError> {
        logs::read_log(&self.store, plugin_id, opts).await
    }
}
