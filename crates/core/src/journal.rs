// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Journal parsing: turning a newline-delimited record file into a
//! replayable sequence of Worker-shaped events.
//!
//! The subtle rule this module encodes: consecutive `assistant` records
//! sharing a message id are merged into one, and that merge survives
//! interleaved `user` (tool-result) records bearing the same id — the
//! Worker emits `assistant(tool_use) -> user(tool_result) -> assistant(text)`
//! under one id during a multi-tool turn. Treating the first `user` record
//! as a flush boundary would produce duplicate assistant messages in replay.

use serde::Deserialize;

use crate::wire::{AssistantEvent, Message, ResultEvent, Usage, UserEvent, UserMessage, WorkerEvent};

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum JournalLine {
    #[serde(rename = "user")]
    User {
        message: UserMessage,
        #[serde(default, rename = "isMeta")]
        is_meta: bool,
    },
    #[serde(rename = "assistant")]
    Assistant { message: Message },
    #[serde(rename = "queue-operation")]
    QueueOperation,
    #[serde(rename = "progress")]
    Progress,
    #[serde(rename = "system")]
    System,
}

/// A journal-derived event, tagged with its origin so downstream consumers
/// see the same shape as a live stream.
#[derive(Debug, Clone)]
pub struct WrappedEvent {
    pub source: &'static str,
    pub event: WorkerEvent,
}

#[derive(Debug, Default)]
pub struct ParsedJournal {
    pub events: Vec<WrappedEvent>,
    /// Lines that failed to parse — skipped silently from `events`, counted here for logging.
    pub malformed_lines: usize,
}

/// Flushes the in-progress assistant merge (if any) into `events`.
fn flush_pending_assistant(pending: &mut Option<(String, Message)>, events: &mut Vec<WrappedEvent>) {
    if let Some((_, message)) = pending.take() {
        events.push(WrappedEvent {
            source: "worker",
            event: WorkerEvent::Assistant(AssistantEvent {
                message,
                is_api_error_message: false,
            }),
        });
    }
}

/// Parses a journal file's contents into a replayable event sequence.
///
/// Always appends a synthesized terminal `result` record carrying the last
/// observed usage, so a replayed journal looks like a completed live turn
/// even though the Worker never emitted one (it wrote the journal instead).
pub fn parse_journal(contents: &str) -> ParsedJournal {
    let mut events = Vec::new();
    let mut malformed_lines = 0;
    let mut pending_assistant: Option<(String, Message)> = None;
    let mut last_usage: Option<Usage> = None;

    for raw_line in contents.lines() {
        let line = raw_line.trim();
        if line.is_empty() {
            continue;
        }

        let record: JournalLine = match serde_json::from_str(line) {
            Ok(record) => record,
            Err(_) => {
                malformed_lines += 1;
                continue;
            }
        };

        match record {
            JournalLine::User { message, is_meta } => {
                if is_meta {
                    continue;
                }
                events.push(WrappedEvent {
                    source: "worker",
                    event: WorkerEvent::User(UserEvent { message }),
                });
            }
            JournalLine::Assistant { message } => {
                if message.usage.is_some() {
                    last_usage = message.usage;
                }
                match pending_assistant.as_mut() {
                    Some((id, accumulated)) if *id == message.id => {
                        accumulated.content.extend(message.content);
                        if message.usage.is_some() {
                            accumulated.usage = message.usage;
                        }
                        if message.stop_reason.is_some() {
                            accumulated.stop_reason = message.stop_reason;
                        }
                    }
                    _ => {
                        flush_pending_assistant(&mut pending_assistant, &mut events);
                        pending_assistant = Some((message.id.clone(), message));
                    }
                }
            }
            JournalLine::QueueOperation | JournalLine::Progress | JournalLine::System => {}
        }
    }

    flush_pending_assistant(&mut pending_assistant, &mut events);

    events.push(WrappedEvent {
        source: "worker",
        event: WorkerEvent::Result(ResultEvent {
            subtype: Some("replay".to_string()),
            usage: last_usage,
            model_usage: Default::default(),
        }),
    });

    ParsedJournal {
        events,
        malformed_lines,
    }
}

#[cfg(test)]
#[path = "journal_tests.rs"]
mod tests;
