// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Unified log access shared by both backends.

use std::io;

use warden_core::{LogOptions, RuntimeError};
use warden_state::StateStore;

use crate::LogStream;

#[cfg(test)]
#[path = "logs_tests.rs"]
mod tests;

/// Open (creating as needed) the append-mode log file for a plugin.
pub(crate) fn open_log_file(
    store: &StateStore,
    plugin_id: &str,
) -> Result<std::fs::File, RuntimeError> {
    let path = store.log_path(plugin_id);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)?;
    Ok(file)
}

/// Open the log for reading. `length > 0` returns only the last N lines;
/// otherwise the whole file streams through untouched.
pub(crate) async fn read_log(
    store: &StateStore,
    plugin_id: &str,
    opts: LogOptions,
) -> Result<LogStream, RuntimeError> {
    let path = store.log_path(plugin_id);
    let file = match tokio::fs::File::open(&path).await {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(RuntimeError::NotFound {
                plugin_id: plugin_id.to_string(),
            })
        }
        Err(e) => return Err(e.into()),
    };
    if opts.length == 0 {
        return Ok(Box::new(file));
    }
    let content = tokio::fs::read(&path).await?;
    let tail = last_lines(&content, opts.length);
    Ok(Box::new(io::Cursor::new(tail)))
}

/// The last `n` lines of `content`, trailing newline preserved.
fn last_lines(content: &[u8], n: usize) -> Vec<u8> {
    let mut seen = 0;
    for (i, byte) in content.iter().enumerate().rev() {
        if *byte != b'\n' || i == content.len() - 1 {
            continue;
        }
        seen += 1;
        if seen == n {
            return content[i + 1..].to_vec();
        }
    }
    content.to_vec()
}
