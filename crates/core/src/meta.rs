// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The durable per-plugin record and the backend discriminant.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::RuntimeError;
use crate::options::RunOptions;

#[cfg(test)]
#[path = "meta_tests.rs"]
mod tests;

/// Isolation strategy hosting a plugin.
///
/// Recorded in the meta record at registration; every subsequent operation
/// for the plugin dispatches on this value, never on a caller-supplied name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    Process,
    Container,
}

impl BackendKind {
    pub fn as_str(self) -> &'static str {
        match self {
            BackendKind::Process => "process",
            BackendKind::Container => "container",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BackendKind {
    type Err = RuntimeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "process" => Ok(BackendKind::Process),
            "container" => Ok(BackendKind::Container),
            other => Err(RuntimeError::InvalidArgument(format!(
                "unknown backend: {other}"
            ))),
        }
    }
}

/// Per-plugin metadata persisted as `state/<plugin_id>/meta.json`.
///
/// Written on registration, overwritten freely (last writer wins), removed
/// only by delete. Field names are a stable surface.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Meta {
    pub plugin_id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub plugin_version: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub device_id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub host_type: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub host_name: String,
    pub backend: BackendKind,
    pub root_dir: PathBuf,
    /// Child working directory (process) or OCI bundle path (container).
    pub work_dir: PathBuf,
    /// Executable path for the process backend; unused by the container
    /// backend, whose bundle already names its entrypoint.
    #[serde(default)]
    pub config: String,
    #[serde(default)]
    pub cpu: String,
    #[serde(default)]
    pub mem: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub env: Vec<String>,
    /// PID of the supervisor process that wrote this record.
    pub runtime_pid: u32,
}

impl Meta {
    /// Rebuild the options a restart needs from the durable record.
    pub fn run_options(&self) -> RunOptions {
        RunOptions {
            plugin_id: self.plugin_id.clone(),
            root_dir: self.root_dir.clone(),
            work_dir: self.work_dir.clone(),
            config: self.config.clone(),
            plugin_version: self.plugin_version.clone(),
            device_id: self.device_id.clone(),
            host_type: self.host_type.clone(),
            host_name: self.host_name.clone(),
            cpu: self.cpu.clone(),
            mem: self.mem.clone(),
            env: self.env.clone(),
        }
    }
}
