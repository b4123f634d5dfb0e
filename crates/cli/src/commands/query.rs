// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `warden list` and `warden state`.

use anyhow::Result;
use warden_runtime::Runtime;

use crate::output::{format_or_json, OutputFormat};

pub async fn list(runtime: &Runtime, format: OutputFormat) -> Result<()> {
    let items = runtime.list().await;
    format_or_json(format, &items, || {
        for item in &items {
            println!(
                "{}\t{}\t{}\t{}",
                item.plugin_id,
                item.backend,
                item.status,
                item.pid.unwrap_or(0)
            );
        }
    })
}

pub async fn state(runtime: &Runtime, plugin_id: &str, format: OutputFormat) -> Result<()> {
    let info = runtime.state(plugin_id).await?;
    format_or_json(format, &info, || {
        println!("plugin_id: {}", info.plugin_id);
        println!("backend: {}", info.backend);
        println!("status: {}", info.status);
        println!("pid: {}", info.pid.unwrap_or(0));
        println!("runtime_pid: {}", info.runtime_pid);
        println!("work_dir: {}", info.work_dir.display());
    })
}
