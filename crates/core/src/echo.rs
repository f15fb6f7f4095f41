// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! User-text echo filtering.
//!
//! The Worker replays the prompt we just wrote to its stdin as a `user`
//! event on stdout. That echo is already rendered client-side the moment
//! the prompt was submitted, so it must be dropped from the broadcast —
//! unless it is actually a tool-result array, or a local-command-output
//! wrapper, neither of which is an echo.

use crate::wire::{UserContent, UserEvent};

/// Marker prefix wrapping the recovered stdout of a slash-command that
/// produced no stream blocks (see `onTurnComplete`'s local-command recovery).
pub const LOCAL_COMMAND_OUTPUT_MARKER: &str = "<local-command-stdout>";

/// Returns true iff `event` is the Worker echoing back text we just sent.
///
/// Tool-result events (array content) are never echoes and must be
/// forwarded regardless of their text.
pub fn is_user_text_echo(event: &UserEvent) -> bool {
    match &event.message.content {
        UserContent::Text(text) => !text.starts_with(LOCAL_COMMAND_OUTPUT_MARKER),
        UserContent::Blocks(_) => false,
    }
}

#[cfg(test)]
#[path = "echo_tests.rs"]
mod tests;
