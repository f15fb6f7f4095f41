// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Session resolution: deciding whether a folder gets a fresh Worker id, a
//! resumed one, or reconnects to an already-running Session.
//!
//! Each input is a lossy signal from an independent filesystem actor (the
//! journal, the handoff file, the in-process registry). The historical bug
//! this tree guards against: resuming a deliberately-closed conversation
//! because a stale handoff file was ignored, silently merging two sessions.

use crate::ids::IdGen;

/// The latest journal record on disk for a folder, if any.
#[derive(Debug, Clone)]
pub struct JournalRecord {
    pub session_id: String,
    pub modified_ms: u64,
}

/// A handoff file the Worker writes when a conversation is closed cleanly.
#[derive(Debug, Clone)]
pub struct Handoff {
    pub session_id: String,
    pub modified_ms: u64,
}

/// An already-running Session for this folder, if one exists in-process.
#[derive(Debug, Clone)]
pub struct InProcess {
    pub session_id: String,
    pub resumable: bool,
}

/// Outcome of session resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub session_id: String,
    pub resumable: bool,
    pub is_reconnect: bool,
}

/// Milliseconds beyond which a handoff is considered stale relative to the
/// journal's modification time: discriminates "same-turn completion" from
/// "resumed later and kept working".
pub const STALE_HANDOFF_THRESHOLD_MS: u64 = 60_000;

/// Discards a handoff that is stale relative to the journal it is paired with.
///
/// A handoff refers to a prior session if the journal was modified
/// meaningfully later than the handoff. Passed as `None` into
/// [`resolve_session`] when stale.
pub fn discard_stale_handoff(
    journal: Option<&JournalRecord>,
    handoff: Option<Handoff>,
) -> Option<Handoff> {
    let (journal, handoff) = match (journal, handoff) {
        (Some(j), Some(h)) => (j, h),
        (_, h) => return h,
    };
    if journal.modified_ms > handoff.modified_ms
        && journal.modified_ms - handoff.modified_ms > STALE_HANDOFF_THRESHOLD_MS
    {
        None
    } else {
        Some(handoff)
    }
}

/// Resolves the session id and resumability for a folder.
///
/// Decision tree, in order:
/// 1. An in-process Session exists → reconnect, preserving its id and resumable bit.
/// 2. No journal → fresh.
/// 3. An exit-marker is present for the latest journal's id → fresh.
/// 4. A (non-stale) handoff id equals the latest journal's id → fresh (clean close).
/// 5. Otherwise → resume, reusing the journal's id.
pub fn resolve_session(
    in_process: Option<&InProcess>,
    journal: Option<&JournalRecord>,
    handoff: Option<&Handoff>,
    exit_marker_present: bool,
    id_gen: &dyn IdGen,
) -> Resolution {
    if let Some(existing) = in_process {
        return Resolution {
            session_id: existing.session_id.clone(),
            resumable: existing.resumable,
            is_reconnect: true,
        };
    }

    let Some(journal) = journal else {
        return Resolution {
            session_id: id_gen.next(),
            resumable: false,
            is_reconnect: false,
        };
    };

    if exit_marker_present {
        return Resolution {
            session_id: id_gen.next(),
            resumable: false,
            is_reconnect: false,
        };
    }

    if let Some(handoff) = handoff {
        if handoff.session_id == journal.session_id {
            return Resolution {
                session_id: id_gen.next(),
                resumable: false,
                is_reconnect: false,
            };
        }
    }

    Resolution {
        session_id: journal.session_id.clone(),
        resumable: true,
        is_reconnect: false,
    }
}

#[cfg(test)]
#[path = "resolve_tests.rs"]
mod tests;
