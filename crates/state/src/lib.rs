// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! StateBuilder: the deterministic per-session state machine that turns a
//! Worker event stream into a client-facing conversation snapshot plus
//! incremental deltas.

mod builder;
mod delta;
mod question;
mod snapshot;

pub use builder::{StateBuilder, SYNTHETIC_PREFIX};
pub use delta::{Activity, Delta};
pub use question::{QuestionData, QuestionEntry, QuestionOption};
pub use snapshot::{
    Message, Role, SessionMeta, SlashCommand, Snapshot, Status, ToolCall, ToolStatus, TurnMetrics,
    LOCAL_SLASH_COMMANDS,
};
