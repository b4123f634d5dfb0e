// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `warden stop`, `warden delete`, `warden destroy`.

use anyhow::Result;
use warden_runtime::Runtime;

pub async fn stop(runtime: &Runtime, plugin_id: &str) -> Result<()> {
    runtime.stop(plugin_id).await?;
    println!("Plugin '{plugin_id}' stopped");
    Ok(())
}

pub async fn delete(runtime: &Runtime, plugin_id: &str) -> Result<()> {
    runtime.delete(plugin_id).await?;
    println!("Plugin '{plugin_id}' deleted");
    Ok(())
}

pub async fn destroy(runtime: &Runtime) -> Result<()> {
    runtime.destroy().await?;
    println!("All plugins removed");
    Ok(())
}
