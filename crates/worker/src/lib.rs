// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Process adapter for the Worker subprocess: spawn with piped stdio, a
//! line-reader task per stream, a bounded stderr ring for diagnostics, and
//! kill-with-escalation for teardown.
//!
//! This crate owns raw PIDs directly — unlike a tmux-mediated session, the
//! Worker here is headless and exclusively owned by the bridge, so its
//! stdin/stdout/stderr are wired straight through [`tokio::process::Command`].

mod error;
mod process;
mod signal;

pub use error::WorkerError;
pub use process::{spawn, WorkerHandle, WorkerIoEvent, STDERR_RING_CAPACITY};
pub use signal::{descendant_pids, is_alive, kill_with_escalation, KILL_ESCALATION_GRACE};
