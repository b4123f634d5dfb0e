// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `warden run` - register a plugin and supervise it.
//!
//! The default path re-execs this binary with `--no-daemon` appended and
//! returns, so the CLI exits promptly while the detached child becomes the
//! plugin's supervisor. Re-exec rather than an in-process thread: the
//! supervisor must outlive the CLI invocation without relying on the shell.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use anyhow::{anyhow, Result};
use clap::Args;
use warden_core::{BackendKind, RunOptions};
use warden_runtime::Runtime;

#[cfg(test)]
#[path = "run_tests.rs"]
mod tests;

#[derive(Args)]
pub struct RunArgs {
    /// Plugin ID
    #[arg(long)]
    pub plugin_id: String,

    /// Backend hosting the plugin: process | container
    #[arg(long, default_value = "process")]
    pub backend: String,

    /// Work dir (process backend) or OCI bundle path (container backend)
    #[arg(long)]
    pub work_dir: PathBuf,

    /// Executable path (required for the process backend)
    #[arg(long, default_value = "")]
    pub config: String,

    /// Plugin version, injected as PLUGIN_VERSION
    #[arg(long, default_value = "")]
    pub plugin_version: String,

    /// Device ID, injected as DEVICE_ID
    #[arg(long, default_value = "")]
    pub device_id: String,

    /// Host type, injected as HOST_TYPE
    #[arg(long, default_value = "")]
    pub host_type: String,

    /// Host name, injected as HOST_NAME
    #[arg(long, default_value = "")]
    pub host_name: String,

    /// CPU quota in fractional cores, e.g. "0.5"
    #[arg(long, default_value = "")]
    pub cpu: String,

    /// Memory quota with optional k/m/g suffix, e.g. "128m"
    #[arg(long, default_value = "")]
    pub mem: String,

    /// Comma-separated KEY=VALUE pairs added to the plugin environment
    #[arg(long, default_value = "")]
    pub env: String,

    /// Stay in the foreground and become the supervisor
    #[arg(long)]
    pub no_daemon: bool,
}

pub async fn run(root: &Path, runtime: &Runtime, args: RunArgs) -> Result<()> {
    let kind: BackendKind = args.backend.parse()?;
    if kind == BackendKind::Process && args.config.is_empty() {
        return Err(anyhow!("process backend requires --config (executable path)"));
    }

    if !args.no_daemon {
        return daemonize();
    }

    let opts = RunOptions {
        plugin_id: args.plugin_id,
        root_dir: root.to_path_buf(),
        work_dir: args.work_dir,
        config: args.config,
        plugin_version: args.plugin_version,
        device_id: args.device_id,
        host_type: args.host_type,
        host_name: args.host_name,
        cpu: args.cpu,
        mem: args.mem,
        env: parse_env(&args.env),
    };
    runtime.run(kind, opts).await?;
    Ok(())
}

/// Split `--env` into trimmed KEY=VALUE tokens.
fn parse_env(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}

/// Re-exec this binary with the original arguments plus `--no-daemon`,
/// detached, stdout and stderr inherited. The child takes the foreground
/// path and becomes the supervisor.
fn daemonize() -> Result<()> {
    let exe = std::env::current_exe()?;
    let args: Vec<std::ffi::OsString> = std::env::args_os().skip(1).collect();
    let child = Command::new(exe)
        .args(&args)
        .arg("--no-daemon")
        .stdin(Stdio::null())
        .spawn()?;
    tracing::info!(pid = child.id(), "supervisor forked");
    Ok(())
}
