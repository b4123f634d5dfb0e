// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Filesystem layout under the runtime root:
//!
//! ```text
//! <root>/state/<plugin_id>/meta.json
//! <root>/state/<plugin_id>/pid              (process backend only)
//! <root>/state/<plugin_id>/stop_requested   (when requested)
//! <root>/logs/<plugin_id>/stdout.log
//! ```
//!
//! Single-file operations are the unit of atomicity. Callers acting on the
//! same plugin from multiple processes accept last-writer-wins for the meta
//! record; the stop marker is monotone, staying in place until the plugin
//! subtree is removed.

use std::fs::{self, DirBuilder};
use std::io;
use std::os::unix::fs::DirBuilderExt;
use std::path::{Path, PathBuf};

use thiserror::Error;
use warden_core::{Meta, RuntimeError};

/// Meta record file name.
pub const META_FILE: &str = "meta.json";
/// Child PID file name (process backend).
pub const PID_FILE: &str = "pid";
/// Stop marker file name; existence is the signal, content is ignored.
pub const STOP_REQUESTED_FILE: &str = "stop_requested";

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;

#[derive(Debug, Error)]
pub enum StateError {
    #[error("plugin not found: {plugin_id}")]
    NotFound { plugin_id: String },

    #[error("meta for {plugin_id}: {source}")]
    Meta {
        plugin_id: String,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Io(#[from] io::Error),
}

impl From<StateError> for RuntimeError {
    fn from(err: StateError) -> Self {
        match err {
            StateError::NotFound { plugin_id } => RuntimeError::NotFound { plugin_id },
            StateError::Io(e) => RuntimeError::Io(e),
            meta @ StateError::Meta { .. } => {
                RuntimeError::Io(io::Error::new(io::ErrorKind::InvalidData, meta))
            }
        }
    }
}

/// Handle on the state subtree under one runtime root. Cheap to clone;
/// every CLI invocation and supervisor for the same root shares the same
/// on-disk view.
#[derive(Debug, Clone)]
pub struct StateStore {
    root_dir: PathBuf,
}

impl StateStore {
    pub fn new(root_dir: impl Into<PathBuf>) -> Self {
        Self {
            root_dir: root_dir.into(),
        }
    }

    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    pub fn state_dir(&self) -> PathBuf {
        self.root_dir.join("state")
    }

    pub fn plugin_dir(&self, plugin_id: &str) -> PathBuf {
        self.state_dir().join(plugin_id)
    }

    /// Unified log location shared by both backends.
    pub fn log_path(&self, plugin_id: &str) -> PathBuf {
        self.root_dir.join("logs").join(plugin_id).join("stdout.log")
    }

    /// Create the root and state directories with mode 0755.
    pub fn ensure_root(&self) -> Result<(), StateError> {
        let mut builder = DirBuilder::new();
        builder.recursive(true).mode(0o755);
        builder.create(self.state_dir())?;
        Ok(())
    }

    /// Create the plugin directory and write the meta record. Overwrite is
    /// permitted; the last writer wins.
    pub fn register(&self, meta: &Meta) -> Result<(), StateError> {
        let dir = self.plugin_dir(&meta.plugin_id);
        fs::create_dir_all(&dir)?;
        let body = serde_json::to_vec_pretty(meta).map_err(|source| StateError::Meta {
            plugin_id: meta.plugin_id.clone(),
            source,
        })?;
        fs::write(dir.join(META_FILE), body)?;
        tracing::debug!(plugin_id = %meta.plugin_id, backend = %meta.backend, "registered plugin");
        Ok(())
    }

    pub fn load_meta(&self, plugin_id: &str) -> Result<Meta, StateError> {
        let path = self.plugin_dir(plugin_id).join(META_FILE);
        let body = match fs::read(&path) {
            Ok(body) => body,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(StateError::NotFound {
                    plugin_id: plugin_id.to_string(),
                })
            }
            Err(e) => return Err(e.into()),
        };
        serde_json::from_slice(&body).map_err(|source| StateError::Meta {
            plugin_id: plugin_id.to_string(),
            source,
        })
    }

    /// Write the stop marker. Idempotent; the supervisor loop observes it
    /// on its next tick and stops restarting the plugin.
    pub fn request_stop(&self, plugin_id: &str) -> Result<(), StateError> {
        let path = self.plugin_dir(plugin_id).join(STOP_REQUESTED_FILE);
        fs::write(path, b"1")?;
        Ok(())
    }

    pub fn stop_requested(&self, plugin_id: &str) -> bool {
        self.plugin_dir(plugin_id).join(STOP_REQUESTED_FILE).exists()
    }

    /// Plugin IDs with a directory under the state root. A missing root
    /// yields an empty list.
    pub fn list_plugin_ids(&self) -> Result<Vec<String>, StateError> {
        let entries = match fs::read_dir(self.state_dir()) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        let mut ids = Vec::new();
        for entry in entries {
            let entry = entry?;
            if entry.file_type()?.is_dir() {
                ids.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        ids.sort();
        Ok(ids)
    }

    /// Remove the plugin subtree, stop marker included. Tolerates a
    /// subtree that is already gone.
    pub fn remove(&self, plugin_id: &str) -> Result<(), StateError> {
        match fs::remove_dir_all(self.plugin_dir(plugin_id)) {
            Ok(()) => {
                tracing::debug!(plugin_id, "removed plugin state");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Record the launched child PID (process backend).
    pub fn write_pid(&self, plugin_id: &str, pid: u32) -> Result<(), StateError> {
        let path = self.plugin_dir(plugin_id).join(PID_FILE);
        fs::write(path, pid.to_string())?;
        Ok(())
    }

    /// The recorded child PID, or `None` when the file is absent or does
    /// not hold a decimal PID.
    pub fn read_pid(&self, plugin_id: &str) -> Result<Option<u32>, StateError> {
        let path = self.plugin_dir(plugin_id).join(PID_FILE);
        let body = match fs::read_to_string(&path) {
            Ok(body) => body,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(body.trim().parse::<u32>().ok())
    }
}
