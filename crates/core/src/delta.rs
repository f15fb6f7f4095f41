// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Delta classification for SSE conflation.
//!
//! A Worker stream event is conflatable iff it is a `content_block_delta`
//! whose inner delta kind carries incremental payload. Everything else
//! flushes whatever is pending first.

use crate::wire::{BlockDelta, StreamEvent};

/// The kind of an accumulated delta, keyed alongside the block index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeltaKind {
    Text,
    InputJson,
    Thinking,
}

/// Key identifying one accumulator bucket.
pub type DeltaKey = (usize, DeltaKind);

/// The accumulated payload for one delta bucket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeltaPayload {
    Text(String),
    InputJson(String),
    Thinking(String),
}

impl DeltaPayload {
    /// Appends `fragment` to this payload in place.
    pub fn append(&mut self, fragment: &str) {
        match self {
            DeltaPayload::Text(s) | DeltaPayload::InputJson(s) | DeltaPayload::Thinking(s) => {
                s.push_str(fragment)
            }
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            DeltaPayload::Text(s) | DeltaPayload::InputJson(s) | DeltaPayload::Thinking(s) => s,
        }
    }
}

/// Classifies a stream event as a conflatable delta, returning its key and
/// fragment, or `None` if the event must flush pending deltas first.
pub fn classify_delta(event: &StreamEvent) -> Option<(DeltaKey, &str)> {
    let StreamEvent::ContentBlockDelta { index, delta } = event else {
        return None;
    };
    match delta {
        BlockDelta::TextDelta { text } => Some(((*index, DeltaKind::Text), text.as_str())),
        BlockDelta::InputJsonDelta { partial_json } => {
            Some(((*index, DeltaKind::InputJson), partial_json.as_str()))
        }
        BlockDelta::Thinking { thinking } => {
            Some(((*index, DeltaKind::Thinking), thinking.as_str()))
        }
        BlockDelta::Signature { .. } => None,
    }
}

/// Builds the initial payload bucket for a freshly-seen delta key.
pub fn new_payload(kind: DeltaKind, fragment: &str) -> DeltaPayload {
    match kind {
        DeltaKind::Text => DeltaPayload::Text(fragment.to_string()),
        DeltaKind::InputJson => DeltaPayload::InputJson(fragment.to_string()),
        DeltaKind::Thinking => DeltaPayload::Thinking(fragment.to_string()),
    }
}

#[cfg(test)]
#[path = "delta_tests.rs"]
mod tests;
