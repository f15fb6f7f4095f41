// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! SSEHub: the client registry, SSE framing, per-client push-token mint,
//! and back-pressure-aware fan-out described in spec §4.4.
//!
//! This crate owns only the subscriber table and outbound framing — it has
//! no notion of a Session's internal state; `bridge-daemon` wires
//! `bridge-session`'s broadcast stream into calls against this hub.

mod error;
mod frame;
mod hub;
mod token;

pub use error::SseError;
pub use frame::{FolderInfo, OutboundFrame};
pub use hub::{next_seq, Connection, SseHub, PING_INTERVAL};
pub use token::mint_push_token;
