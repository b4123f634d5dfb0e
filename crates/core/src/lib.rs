// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! warden-core: shared types for the warden plugin supervisor

pub mod error;
pub mod limits;
pub mod meta;
pub mod options;

pub use error::RuntimeError;
pub use limits::{cpu_shares, mem_bytes};
pub use meta::{BackendKind, Meta};
pub use options::{InstanceInfo, LogOptions, RunOptions, StateInfo};

/// Status string reported for a live plugin.
pub const STATUS_RUNNING: &str = "running";
/// Status string reported for a plugin with no live process or container.
pub const STATUS_STOPPED: &str = "stopped";
