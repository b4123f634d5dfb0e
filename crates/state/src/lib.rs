// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! warden-state: the on-disk state store mediating between short-lived CLI
//! invocations and long-lived supervisor processes.

mod store;

pub use store::{StateError, StateStore, META_FILE, PID_FILE, STOP_REQUESTED_FILE};
