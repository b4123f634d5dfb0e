// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-plugin supervisor: periodic liveness checks with restart on
//! unexpected exit, terminated by the stop marker, cancellation, or a
//! signal to the supervisor process.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use warden_backend::PluginBackend;
use warden_core::RuntimeError;
use warden_state::StateStore;

#[cfg(test)]
#[path = "supervisor_tests.rs"]
mod tests;

/// Default interval between liveness checks.
pub const SUPERVISE_INTERVAL: Duration = Duration::from_secs(3);

/// Watch one plugin until cancellation or a stop request.
///
/// A restart needs a definitive non-running status: transient state errors
/// and a missing meta record both degrade to waiting for the next tick, so
/// the loop never restarts a plugin on partial information. The stop marker
/// is only ever observed here, never reset; delete clears it by removing
/// the plugin subtree.
pub async fn monitor(
    cancel: CancellationToken,
    plugin_id: &str,
    store: &StateStore,
    backend: &dyn PluginBackend,
    interval: Duration,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    // The first tick completes immediately; consume it so the workload gets
    // one full interval before its first liveness check.
    ticker.tick().await;
    loop {
        tokio::select! {
            _ = cancel.cancelled() => return,
            _ = ticker.tick() => {}
        }
        if store.stop_requested(plugin_id) {
            tracing::info!(plugin_id, "stop requested, supervisor exiting");
            return;
        }
        let info = match backend.state(plugin_id).await {
            Ok(info) => info,
            Err(e) => {
                tracing::debug!(plugin_id, error = %e, "liveness check failed");
                continue;
            }
        };
        if info.is_running() {
            continue;
        }
        let meta = match store.load_meta(plugin_id) {
            Ok(meta) => meta,
            Err(e) => {
                tracing::debug!(plugin_id, error = %e, "meta unavailable, skipping restart");
                continue;
            }
        };
        tracing::info!(plugin_id, status = %info.status, "plugin exited unexpectedly, restarting");
        if let Err(e) = backend.run(meta.run_options()).await {
            tracing::warn!(plugin_id, error = %e, "restart failed");
        }
    }
}

/// Install SIGTERM/SIGINT handling for the supervisor process: write the
/// stop marker, stop the workload, then cancel the loop.
pub fn handle_signals(
    cancel: CancellationToken,
    plugin_id: String,
    store: StateStore,
    backend: Arc<dyn PluginBackend>,
) -> Result<(), RuntimeError> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut term = signal(SignalKind::terminate())?;
    let mut int = signal(SignalKind::interrupt())?;
    tokio::spawn(async move {
        tokio::select! {
            _ = term.recv() => {}
            _ = int.recv() => {}
        }
        tracing::info!(plugin_id = %plugin_id, "signal received, stopping plugin");
        if let Err(e) = store.request_stop(&plugin_id) {
            tracing::warn!(plugin_id = %plugin_id, error = %e, "failed to write stop marker");
        }
        if let Err(e) = backend.stop(&plugin_id).await {
            tracing::warn!(plugin_id = %plugin_id, error = %e, "stop on signal failed");
        }
        cancel.cancel();
    });
    Ok(())
}
