// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Incremental deltas StateBuilder emits per handled event.

use serde::{Deserialize, Serialize};

use crate::question::QuestionData;
use crate::snapshot::Status;

/// What kind of content a streaming content block represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Activity {
    Writing,
    Tool,
    Thinking,
}

/// One incremental update StateBuilder hands back to the Session for
/// broadcast. Structural deltas (everything but `Content`/`ThinkingContent`,
/// which are themselves structural but high-frequency within one block)
/// always deliver even under SSE back-pressure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Delta {
    Status {
        status: Status,
    },
    Activity {
        index: usize,
        activity: Activity,
    },
    Content {
        index: usize,
        text: String,
    },
    ThinkingContent {
        index: usize,
        text: String,
    },
    ToolStart {
        id: String,
        name: String,
        input: serde_json::Value,
    },
    ToolComplete {
        id: String,
        status: crate::snapshot::ToolStatus,
        output: Option<serde_json::Value>,
    },
    AskUser {
        tool_use_id: String,
        questions: QuestionData,
    },
    MessageStart,
    ApiError {
        message: String,
    },
}
