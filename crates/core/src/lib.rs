// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! PureLogic: the stateless helpers behind session resolution, journal
//! parsing, delta classification, prompt coalescing, echo filtering, crash
//! classification, path validation and Worker argv construction.
//!
//! Everything in this crate is a pure function or an immutable value type —
//! no I/O, no clocks beyond the [`clock`] abstraction, no process state.
//! `bridge-session` and `bridge-state` own the mutable machinery that calls
//! into it.

pub mod argv;
pub mod clock;
pub mod coalesce;
pub mod crash;
pub mod delta;
pub mod echo;
pub mod error;
pub mod ids;
pub mod journal;
pub mod path;
pub mod resolve;
pub mod wire;

pub use argv::{build_worker_argv, ContinuationMode, STRIPPED_ENV_VARS};
pub use clock::{Clock, FakeClock, SystemClock};
pub use coalesce::coalesce_prompts;
pub use crash::{auto_resume_message, classify_restart, RestartCause, ShutdownContext};
pub use delta::{classify_delta, new_payload, DeltaKey, DeltaKind, DeltaPayload};
pub use echo::is_user_text_echo;
pub use error::CoreError;
pub use ids::{AgentSessionId, ClientId, IdGen, RequestId, SequentialIdGen, ShortId, UuidIdGen};
pub use journal::{parse_journal, ParsedJournal, WrappedEvent};
pub use path::validate_folder_path;
pub use resolve::{
    discard_stale_handoff, resolve_session, Handoff, InProcess, JournalRecord, Resolution,
    STALE_HANDOFF_THRESHOLD_MS,
};
pub use wire::*;
