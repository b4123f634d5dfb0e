// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! warden-backend: the isolation backends hosting plugin workloads.
//!
//! Two implementations (bare host processes, and OCI containers driven
//! through an external runtime) satisfy one operational contract, so
//! state, list, and log semantics do not depend on how a plugin is hosted.

mod container;
mod logs;
mod process;

pub use container::ContainerBackend;
pub use process::ProcessBackend;

use async_trait::async_trait;
use warden_core::{InstanceInfo, LogOptions, RunOptions, RuntimeError, StateInfo};

/// Readable byte stream over a plugin's unified log.
pub type LogStream = Box<dyn tokio::io::AsyncRead + Send + Unpin>;

/// Operational contract every isolation backend satisfies.
#[async_trait]
pub trait PluginBackend: Send + Sync {
    /// Start the plugin. Supervision belongs to the caller; run returns
    /// once the workload has been handed to the host mechanism.
    async fn run(&self, opts: RunOptions) -> Result<(), RuntimeError>;

    /// Stop the plugin without removing any state. Never fails for
    /// "already stopped".
    async fn stop(&self, plugin_id: &str) -> Result<(), RuntimeError>;

    /// Stop the plugin, then remove its work dir and state subtree.
    async fn delete(&self, plugin_id: &str) -> Result<(), RuntimeError>;

    /// Status of a single plugin owned by this backend.
    async fn state(&self, plugin_id: &str) -> Result<StateInfo, RuntimeError>;

    /// All plugins owned by this backend. Individual plugins that cannot
    /// be queried are reported as stopped rather than failing the listing.
    async fn list(&self) -> Result<Vec<InstanceInfo>, RuntimeError>;

    /// Byte stream over the plugin's unified log.
    async fn log(&self, plugin_id: &str, opts: LogOptions) -> Result<LogStream, RuntimeError>;
}
