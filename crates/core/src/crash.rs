// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Crash-vs-clean-shutdown classification, and the auto-resume messages it
//! produces for the Worker.

use serde::{Deserialize, Serialize};

/// Persisted at graceful shutdown; consumed exactly once on next startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShutdownContext {
    pub signal: String,
    pub timestamp_ms: u64,
    pub active_turn_folders: Vec<String>,
}

/// How the bridge came to restart, relative to a given folder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestartCause {
    /// No shutdown context, or one too old to trust.
    Crash,
    /// We killed our own Worker mid-turn while shutting down gracefully.
    SelfCaused,
    /// Something outside the bridge killed it (no shutdown context involvement).
    External,
}

/// Shutdown contexts older than this are no longer trusted as evidence of a
/// graceful shutdown — treat the restart as an ungraceful crash.
pub const SHUTDOWN_CONTEXT_MAX_AGE_MS: u64 = 24 * 60 * 60 * 1000;

/// Classifies why the bridge is restarting, for a specific folder.
pub fn classify_restart(
    context: Option<&ShutdownContext>,
    folder: &str,
    now_ms: u64,
) -> RestartCause {
    let Some(context) = context else {
        return RestartCause::Crash;
    };

    let age_ms = now_ms.saturating_sub(context.timestamp_ms);
    if age_ms >= SHUTDOWN_CONTEXT_MAX_AGE_MS {
        return RestartCause::Crash;
    }

    if context
        .active_turn_folders
        .iter()
        .any(|f| f.as_str() == folder)
    {
        RestartCause::SelfCaused
    } else {
        RestartCause::External
    }
}

/// The synthetic auto-resume prompt text for a given restart cause.
pub fn auto_resume_message(cause: RestartCause) -> &'static str {
    match cause {
        RestartCause::Crash => {
            "[guéridon:system] The bridge crashed and recovered. Continue where you left off."
        }
        RestartCause::SelfCaused => {
            "[guéridon:system] The bridge shut down mid-turn, likely caused this. Continue where you left off."
        }
        RestartCause::External => {
            "[guéridon:system] The bridge was restarted externally. Continue where you left off."
        }
    }
}

#[cfg(test)]
#[path = "crash_tests.rs"]
mod tests;
