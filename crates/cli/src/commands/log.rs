// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `warden log` - stream plugin log bytes to stdout.

use anyhow::Result;
use clap::Args;
use warden_core::LogOptions;
use warden_runtime::Runtime;

use crate::output::OutputFormat;

#[derive(Args)]
pub struct LogArgs {
    /// Plugin ID
    #[arg(long)]
    pub plugin_id: String,

    /// Output format; log bytes pass through unchanged either way
    #[arg(long, value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Return only the last N lines (0 = entire log)
    #[arg(long, default_value_t = 0)]
    pub length: usize,
}

pub async fn log(runtime: &Runtime, args: LogArgs) -> Result<()> {
    tracing::debug!(plugin_id = %args.plugin_id, format = ?args.format, length = args.length, "streaming log");
    let mut stream = runtime
        .log(&args.plugin_id, LogOptions { length: args.length })
        .await?;
    let mut stdout = tokio::io::stdout();
    tokio::io::copy(&mut stream, &mut stdout).await?;
    Ok(())
}
