// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Operation inputs and the views returned by state/list.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::meta::BackendKind;
use crate::STATUS_RUNNING;

/// Options for starting a plugin.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub plugin_id: String,
    /// Runtime root directory.
    pub root_dir: PathBuf,
    /// Child working directory (process) or OCI bundle path (container).
    pub work_dir: PathBuf,
    /// Executable path; required by the process backend only.
    pub config: String,
    pub plugin_version: String,
    pub device_id: String,
    pub host_type: String,
    pub host_name: String,
    /// CPU quota in fractional cores, e.g. "0.5".
    pub cpu: String,
    /// Memory quota with optional k/m/g suffix, e.g. "128m".
    pub mem: String,
    /// KEY=VALUE entries appended after the injected variables; later
    /// entries override earlier ones.
    pub env: Vec<String>,
}

/// Options for reading a plugin log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogOptions {
    /// When non-zero, only the last `length` lines are returned.
    pub length: usize,
}

/// Summary row for list output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstanceInfo {
    pub plugin_id: String,
    pub backend: BackendKind,
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pid: Option<u32>,
    pub work_dir: PathBuf,
}

/// Full view of a single plugin for state output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateInfo {
    pub plugin_id: String,
    pub backend: BackendKind,
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pid: Option<u32>,
    /// PID of the supervisor process registered for this plugin.
    pub runtime_pid: u32,
    pub work_dir: PathBuf,
}

impl StateInfo {
    pub fn is_running(&self) -> bool {
        self.status == STATUS_RUNNING
    }
}
