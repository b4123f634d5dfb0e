// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The runtime facade: one state store, both backends, dispatch by the
//! backend recorded in each plugin's meta.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use warden_backend::{ContainerBackend, LogStream, PluginBackend, ProcessBackend};
use warden_core::{
    BackendKind, InstanceInfo, LogOptions, Meta, RunOptions, RuntimeError, StateInfo,
};
use warden_state::StateStore;

use crate::supervisor;

#[cfg(test)]
#[path = "facade_tests.rs"]
mod tests;

/// Environment override for the supervisor poll interval, in milliseconds.
const POLL_INTERVAL_ENV: &str = "WARDEN_POLL_INTERVAL_MS";

/// Unified entry point for every CLI verb.
///
/// The backend name is advisory at run time only; all later operations
/// route through the meta record, so a plugin can never be addressed
/// through the wrong isolation mechanism.
pub struct Runtime {
    store: StateStore,
    process: Arc<ProcessBackend>,
    container: Arc<ContainerBackend>,
}

impl Runtime {
    /// A runtime rooted at `root_dir`, using the default `runc` binary for
    /// the container backend.
    pub fn new(root_dir: impl Into<PathBuf>) -> Self {
        Self::with_container_runtime(root_dir, "")
    }

    /// A runtime with an explicit container runtime binary.
    pub fn with_container_runtime(
        root_dir: impl Into<PathBuf>,
        runtime_bin: impl Into<String>,
    ) -> Self {
        let store = StateStore::new(root_dir);
        Self {
            process: Arc::new(ProcessBackend::new(store.clone())),
            container: Arc::new(ContainerBackend::new(store.clone(), runtime_bin)),
            store,
        }
    }

    pub fn store(&self) -> &StateStore {
        &self.store
    }

    fn backend_for_kind(&self, kind: BackendKind) -> Arc<dyn PluginBackend> {
        match kind {
            BackendKind::Process => Arc::clone(&self.process) as Arc<dyn PluginBackend>,
            BackendKind::Container => Arc::clone(&self.container) as Arc<dyn PluginBackend>,
        }
    }

    /// The backend recorded for a plugin in its meta record.
    fn backend_for(&self, plugin_id: &str) -> Result<Arc<dyn PluginBackend>, RuntimeError> {
        let meta = self.store.load_meta(plugin_id)?;
        Ok(self.backend_for_kind(meta.backend))
    }

    fn poll_interval() -> Duration {
        std::env::var(POLL_INTERVAL_ENV)
            .ok()
            .and_then(|raw| raw.parse::<u64>().ok())
            .filter(|ms| *ms > 0)
            .map(Duration::from_millis)
            .unwrap_or(supervisor::SUPERVISE_INTERVAL)
    }

    /// Register the plugin, launch it, and supervise until a stop request
    /// or signal. Does not return promptly; callers needing the CLI to
    /// return fork first and re-enter here in the child.
    pub async fn run(&self, kind: BackendKind, opts: RunOptions) -> Result<(), RuntimeError> {
        if opts.plugin_id.is_empty() {
            return Err(RuntimeError::InvalidArgument(
                "plugin id must not be empty".to_string(),
            ));
        }
        if kind == BackendKind::Process && opts.config.is_empty() {
            return Err(RuntimeError::InvalidArgument(
                "process backend requires a config executable".to_string(),
            ));
        }
        self.store.ensure_root()?;
        let backend = self.backend_for_kind(kind);
        let meta = Meta {
            plugin_id: opts.plugin_id.clone(),
            plugin_version: opts.plugin_version.clone(),
            device_id: opts.device_id.clone(),
            host_type: opts.host_type.clone(),
            host_name: opts.host_name.clone(),
            backend: kind,
            root_dir: self.store.root_dir().to_path_buf(),
            work_dir: opts.work_dir.clone(),
            config: opts.config.clone(),
            cpu: opts.cpu.clone(),
            mem: opts.mem.clone(),
            env: opts.env.clone(),
            runtime_pid: std::process::id(),
        };
        self.store.register(&meta)?;
        if let Err(e) = backend.run(opts.clone()).await {
            // Roll back our own registration so a failed launch leaves no
            // trace; the error itself still propagates.
            if let Err(remove_err) = self.store.remove(&opts.plugin_id) {
                tracing::warn!(plugin_id = %opts.plugin_id, error = %remove_err, "rollback failed");
            }
            return Err(e);
        }

        let cancel = CancellationToken::new();
        supervisor::handle_signals(
            cancel.clone(),
            opts.plugin_id.clone(),
            self.store.clone(),
            Arc::clone(&backend),
        )?;
        supervisor::monitor(
            cancel,
            &opts.plugin_id,
            &self.store,
            backend.as_ref(),
            Self::poll_interval(),
        )
        .await;
        if kind == BackendKind::Process {
            self.process.unregister(&opts.plugin_id);
        }
        Ok(())
    }

    /// Record the stop request, then stop the plugin via its backend.
    pub async fn stop(&self, plugin_id: &str) -> Result<(), RuntimeError> {
        if let Err(e) = self.store.request_stop(plugin_id) {
            tracing::warn!(plugin_id, error = %e, "failed to write stop marker");
        }
        let backend = self.backend_for(plugin_id)?;
        backend.stop(plugin_id).await
    }

    /// Record the stop request, then stop the plugin and remove its work
    /// dir and state subtree.
    pub async fn delete(&self, plugin_id: &str) -> Result<(), RuntimeError> {
        if let Err(e) = self.store.request_stop(plugin_id) {
            tracing::warn!(plugin_id, error = %e, "failed to write stop marker");
        }
        let backend = self.backend_for(plugin_id)?;
        backend.delete(plugin_id).await
    }

    pub async fn state(&self, plugin_id: &str) -> Result<StateInfo, RuntimeError> {
        let backend = self.backend_for(plugin_id)?;
        backend.state(plugin_id).await
    }

    /// All plugins across both backends, process entries first. A failing
    /// backend contributes nothing rather than failing the listing.
    pub async fn list(&self) -> Vec<InstanceInfo> {
        let mut all = Vec::new();
        match self.process.list().await {
            Ok(mut items) => all.append(&mut items),
            Err(e) => tracing::warn!(error = %e, "process backend list failed"),
        }
        match self.container.list().await {
            Ok(mut items) => all.append(&mut items),
            Err(e) => tracing::warn!(error = %e, "container backend list failed"),
        }
        all
    }

    pub async fn log(
        &self,
        plugin_id: &str,
        opts: LogOptions,
    ) -> Result<LogStream, RuntimeError> {
        let backend = self.backend_for(plugin_id)?;
        backend.log(plugin_id, opts).await
    }

    /// Stop and remove every plugin under this root. Per-plugin failures
    /// are logged and skipped.
    pub async fn destroy(&self) -> Result<(), RuntimeError> {
        let ids = self.store.list_plugin_ids()?;
        for id in ids {
            if let Err(e) = self.store.request_stop(&id) {
                tracing::warn!(plugin_id = %id, error = %e, "failed to write stop marker");
            }
            let backend = match self.backend_for(&id) {
                Ok(backend) => backend,
                Err(e) => {
                    tracing::warn!(plugin_id = %id, error = %e, "no backend for plugin, skipping");
                    continue;
                }
            };
            if let Err(e) = backend.delete(&id).await {
                tracing::warn!(plugin_id = %id, error = %e, "delete failed during destroy");
            }
        }
        Ok(())
    }
}
