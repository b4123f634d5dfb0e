// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error taxonomy shared by the runtime facade and both backends.

use crate::meta::BackendKind;
use thiserror::Error;

/// Errors surfaced by plugin operations.
///
/// The facade propagates everything from `run` (after rolling back its own
/// registration); stop/delete/destroy are best-effort and log instead.
#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("plugin not found: {plugin_id}")]
    NotFound { plugin_id: String },

    #[error("plugin {plugin_id} is owned by the {actual} backend, not {expected}")]
    BackendMismatch {
        plugin_id: String,
        expected: BackendKind,
        actual: BackendKind,
    },

    #[error("launch failed: {0}")]
    Launch(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("external runtime: {0}")]
    ExternalRuntime(String),
}
