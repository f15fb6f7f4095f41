// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! StateBuilder: a deterministic, side-effect-free state machine that
//! reconstructs a conversation snapshot from a partially-streamed,
//! occasionally-duplicated Worker event stream.
//!
//! Plain data plus dispatch on `event.type` — no inheritance, no mixins.
//! Every public method takes `&mut self` and returns the deltas (if any)
//! the caller should broadcast; the snapshot itself is read through
//! [`StateBuilder::snapshot`].

use std::collections::{HashMap, HashSet};

use bridge_core::{
    BlockDelta, ContentBlock, ContentBlockStart, StreamEvent, ToolResultContent, UserContent,
    WorkerEvent, WrappedEvent,
};

use crate::delta::{Activity, Delta};
use crate::question::QuestionData;
use crate::snapshot::{Message, Role, SessionMeta, SlashCommand, Snapshot, Status, ToolCall, ToolStatus, TurnMetrics};

/// Prefix marking a bridge-injected message (auto-resume notices, deposit
/// notes) so the UI can style it distinctly from human input.
pub const SYNTHETIC_PREFIX: &str = "[guéridon:system]";

/// Tool name reserved for structured question prompts — surfaced only on
/// `content_block_stop`, never counted toward the per-turn tool-call total.
const ASK_USER_QUESTION_TOOL: &str = "AskUserQuestion";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BlockKind {
    Text,
    Thinking,
    ToolUse,
}

#[derive(Debug, Default)]
pub struct StateBuilder {
    snapshot: Snapshot,
    replay_mode: bool,

    // Streaming scratch, reset on message_start / inner-API-call detection.
    text_acc: HashMap<usize, String>,
    thinking_acc: HashMap<usize, String>,
    tool_json_acc: HashMap<usize, String>,
    block_kind: HashMap<usize, BlockKind>,
    block_tool: HashMap<usize, (String, String)>, // index -> (tool_use_id, name)
    ask_user_suppressed: HashSet<String>,          // tool_use_id
    pending_tool_calls: HashMap<String, ToolCall>, // tool_use_id -> call, not yet attached to a message

    // Cross-turn bookkeeping.
    seen_message_ids: HashSet<String>,
    tool_position: HashMap<String, (usize, usize)>, // tool_use_id -> (message index, tool_calls index)
    last_committed_index: Option<usize>,
    committed_this_turn: bool,

    // Turn metrics.
    output_tokens_by_id: HashMap<String, u64>,
    last_input_tokens: u64,
    tool_call_count_this_turn: u32,
    context_window: Option<u64>,
}

impl StateBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    pub fn turn_metrics(&self) -> TurnMetrics {
        TurnMetrics {
            input_tokens: self.last_input_tokens,
            output_tokens: self.output_tokens_by_id.values().sum(),
            tool_call_count: self.tool_call_count_this_turn,
        }
    }

    /// Replays a previously-parsed journal sequence, returning the deltas a
    /// live stream would have produced. Assistant commits clear streaming
    /// scratch unconditionally in this mode, since a replayed sequence never
    /// carries its own `message_start` events.
    pub fn replay_from_jsonl(&mut self, events: &[WrappedEvent]) -> Vec<Delta> {
        self.replay_mode = true;
        let mut deltas = Vec::new();
        for wrapped in events {
            deltas.extend(self.handle_event(&wrapped.event));
        }
        self.replay_mode = false;
        deltas
    }

    pub fn handle_event(&mut self, event: &WorkerEvent) -> Vec<Delta> {
        match event {
            WorkerEvent::System(system) => self.handle_system(system),
            WorkerEvent::StreamEvent { event } => self.handle_stream_event(event),
            WorkerEvent::Assistant(assistant) => self.handle_assistant(assistant),
            WorkerEvent::User(user) => self.handle_user(user),
            WorkerEvent::Result(result) => self.handle_result(result),
        }
    }

    fn reset_turn(&mut self) {
        self.tool_call_count_this_turn = 0;
        self.output_tokens_by_id.clear();
        self.committed_this_turn = false;
        self.last_committed_index = None;
        self.pending_tool_calls.clear();
    }

    fn clear_streaming_scratch(&mut self) {
        self.text_acc.clear();
        self.thinking_acc.clear();
        self.tool_json_acc.clear();
        self.block_kind.clear();
        self.block_tool.clear();
        self.ask_user_suppressed.clear();
    }

    fn handle_system(&mut self, system: &bridge_core::SystemEvent) -> Vec<Delta> {
        if system.subtype != "init" {
            return Vec::new();
        }
        self.reset_turn();
        self.snapshot.meta.model = system.model.clone();
        self.snapshot.meta.id = system.session_id.clone();
        self.snapshot.slash_commands = system
            .slash_commands
            .iter()
            .map(|name| SlashCommand::new(name.clone()))
            .collect();
        self.snapshot.status = Status::Working;
        vec![Delta::Status {
            status: Status::Working,
        }]
    }

    fn handle_stream_event(&mut self, event: &StreamEvent) -> Vec<Delta> {
        match event {
            StreamEvent::MessageStart => {
                self.clear_streaming_scratch();
                self.pending_tool_calls.clear();
                vec![Delta::MessageStart]
            }
            StreamEvent::ContentBlockStart {
                index,
                content_block,
            } => self.handle_content_block_start(*index, content_block),
            StreamEvent::ContentBlockDelta { index, delta } => {
                self.accumulate_delta(*index, delta);
                Vec::new()
            }
            StreamEvent::ContentBlockStop { index } => self.handle_content_block_stop(*index),
            StreamEvent::MessageDelta | StreamEvent::MessageStop => Vec::new(),
        }
    }

    fn handle_content_block_start(
        &mut self,
        index: usize,
        content_block: &ContentBlockStart,
    ) -> Vec<Delta> {
        // Reusing an index without a message_start means an inner API call
        // within the same turn. Clear scratch but keep dedup/counters.
        if self.block_kind.contains_key(&index) {
            self.clear_streaming_scratch();
        }

        match content_block {
            ContentBlockStart::Text { .. } => {
                self.block_kind.insert(index, BlockKind::Text);
                vec![Delta::Activity {
                    index,
                    activity: Activity::Writing,
                }]
            }
            ContentBlockStart::Thinking { .. } => {
                self.block_kind.insert(index, BlockKind::Thinking);
                vec![Delta::Activity {
                    index,
                    activity: Activity::Thinking,
                }]
            }
            ContentBlockStart::ToolUse { id, name, .. } => {
                self.block_kind.insert(index, BlockKind::ToolUse);
                self.block_tool.insert(index, (id.clone(), name.clone()));
                if name == ASK_USER_QUESTION_TOOL {
                    self.ask_user_suppressed.insert(id.clone());
                    return Vec::new();
                }
                vec![Delta::Activity {
                    index,
                    activity: Activity::Tool,
                }]
            }
        }
    }

    fn accumulate_delta(&mut self, index: usize, delta: &BlockDelta) {
        match delta {
            BlockDelta::TextDelta { text } => {
                self.text_acc.entry(index).or_default().push_str(text);
            }
            BlockDelta::InputJsonDelta { partial_json } => {
                self.tool_json_acc
                    .entry(index)
                    .or_default()
                    .push_str(partial_json);
            }
            BlockDelta::Thinking { thinking } => {
                self.thinking_acc
                    .entry(index)
                    .or_default()
                    .push_str(thinking);
            }
            BlockDelta::Signature { .. } => {}
        }
    }

    fn handle_content_block_stop(&mut self, index: usize) -> Vec<Delta> {
        let Some(kind) = self.block_kind.get(&index).copied() else {
            return Vec::new();
        };

        match kind {
            BlockKind::Text => {
                let joined = self.joined_text_blocks(BlockKind::Text, &self.text_acc);
                vec![Delta::Content {
                    index,
                    text: joined,
                }]
            }
            BlockKind::Thinking => {
                let joined = self.joined_text_blocks(BlockKind::Thinking, &self.thinking_acc);
                vec![Delta::ThinkingContent {
                    index,
                    text: joined,
                }]
            }
            BlockKind::ToolUse => self.handle_tool_use_stop(index),
        }
    }

    fn joined_text_blocks(&self, kind: BlockKind, acc: &HashMap<usize, String>) -> String {
        let mut indices: Vec<usize> = self
            .block_kind
            .iter()
            .filter(|(_, k)| **k == kind)
            .map(|(i, _)| *i)
            .collect();
        indices.sort_unstable();
        indices
            .into_iter()
            .filter_map(|i| acc.get(&i).cloned())
            .collect::<Vec<_>>()
            .join("")
    }

    fn handle_tool_use_stop(&mut self, index: usize) -> Vec<Delta> {
        let Some((id, name)) = self.block_tool.get(&index).cloned() else {
            return Vec::new();
        };

        let raw_json = self.tool_json_acc.get(&index).cloned().unwrap_or_default();
        let input = if raw_json.trim().is_empty() {
            serde_json::Value::Object(Default::default())
        } else {
            serde_json::from_str(&raw_json).unwrap_or(serde_json::Value::Null)
        };

        if self.ask_user_suppressed.contains(&id) {
            let questions: QuestionData = serde_json::from_value(input).unwrap_or(QuestionData {
                questions: Vec::new(),
            });
            return vec![Delta::AskUser {
                tool_use_id: id,
                questions,
            }];
        }

        self.tool_call_count_this_turn += 1;
        let tool_call = ToolCall {
            id: id.clone(),
            name: name.clone(),
            input: input.clone(),
            output: None,
            status: ToolStatus::Pending,
        };

        if self.committed_this_turn {
            if let Some(idx) = self.last_committed_index {
                let position = self.snapshot.messages[idx].tool_calls.len();
                self.snapshot.messages[idx].tool_calls.push(tool_call);
                self.tool_position.insert(id.clone(), (idx, position));
            }
        } else {
            self.pending_tool_calls.insert(id.clone(), tool_call);
        }

        vec![Delta::ToolStart { id, name, input }]
    }

    fn handle_assistant(&mut self, assistant: &bridge_core::AssistantEvent) -> Vec<Delta> {
        if assistant.is_api_error_message {
            let text = assistant
                .message
                .content
                .iter()
                .find_map(|block| match block {
                    ContentBlock::Text { text } => Some(text.clone()),
                    _ => None,
                })
                .unwrap_or_default();
            let formatted = format_api_error(&text);
            self.snapshot
                .messages
                .push(Message::assistant(formatted.clone()).with_synthetic());
            self.snapshot.status = Status::Idle;
            return vec![Delta::ApiError { message: formatted }];
        }

        if let Some(usage) = assistant.message.usage {
            self.output_tokens_by_id
                .insert(assistant.message.id.clone(), usage.output_tokens);
            self.last_input_tokens =
                usage.input_tokens + usage.cache_read_input_tokens + usage.cache_creation_input_tokens;
            self.recompute_context_pct();
        }

        if self.seen_message_ids.contains(&assistant.message.id) {
            return Vec::new();
        }
        self.seen_message_ids.insert(assistant.message.id.clone());

        if self.committed_this_turn && !self.replay_mode {
            self.clear_streaming_scratch();
        }

        let content = if !self.text_acc.is_empty() {
            self.joined_text_blocks(BlockKind::Text, &self.text_acc)
        } else {
            assistant
                .message
                .content
                .iter()
                .filter_map(|b| match b {
                    ContentBlock::Text { text } => Some(text.as_str()),
                    _ => None,
                })
                .collect::<Vec<_>>()
                .join("")
        };

        let thinking = if !self.thinking_acc.is_empty() {
            Some(self.joined_text_blocks(BlockKind::Thinking, &self.thinking_acc))
        } else {
            assistant.message.content.iter().find_map(|b| match b {
                ContentBlock::Thinking { thinking } => Some(thinking.clone()),
                _ => None,
            })
        };

        let mut tool_calls = Vec::new();
        for block in &assistant.message.content {
            if let ContentBlock::ToolUse { id, .. } = block {
                if let Some(call) = self.pending_tool_calls.remove(id) {
                    tool_calls.push(call);
                }
            }
        }

        let mut message = Message::assistant(content);
        message.thinking = thinking;
        message.tool_calls = tool_calls;

        self.snapshot.messages.push(message);
        let idx = self.snapshot.messages.len() - 1;
        for (position, call) in self.snapshot.messages[idx].tool_calls.iter().enumerate() {
            self.tool_position.insert(call.id.clone(), (idx, position));
        }
        self.last_committed_index = Some(idx);
        self.committed_this_turn = true;

        Vec::new()
    }

    fn handle_user(&mut self, user: &bridge_core::UserEvent) -> Vec<Delta> {
        match &user.message.content {
            UserContent::Text(text) => {
                let synthetic = text.starts_with(SYNTHETIC_PREFIX);
                let mut message = Message::user(text.clone());
                message.synthetic = synthetic;
                self.snapshot.messages.push(message);
                Vec::new()
            }
            UserContent::Blocks(blocks) => {
                let mut deltas = Vec::new();
                for block in blocks {
                    if let ContentBlock::ToolResult {
                        tool_use_id,
                        content,
                        is_error,
                    } = block
                    {
                        if self.ask_user_suppressed.contains(tool_use_id) {
                            continue;
                        }
                        let Some((msg_idx, tool_idx)) = self.tool_position.get(tool_use_id).copied()
                        else {
                            continue;
                        };
                        let status = if *is_error {
                            ToolStatus::Error
                        } else {
                            ToolStatus::Completed
                        };
                        let output = tool_result_to_value(content);
                        if let Some(call) = self
                            .snapshot
                            .messages
                            .get_mut(msg_idx)
                            .and_then(|m| m.tool_calls.get_mut(tool_idx))
                        {
                            call.output = output.clone();
                            call.status = status;
                        }
                        deltas.push(Delta::ToolComplete {
                            id: tool_use_id.clone(),
                            status,
                            output,
                        });
                    }
                }
                deltas
            }
        }
    }

    fn handle_result(&mut self, result: &bridge_core::ResultEvent) -> Vec<Delta> {
        self.snapshot.status = Status::Idle;
        if let Some(usage) = result.model_usage.values().find_map(|m| m.context_window) {
            self.context_window = Some(usage);
        }
        self.recompute_context_pct();
        vec![Delta::Status {
            status: Status::Idle,
        }]
    }

    fn recompute_context_pct(&mut self) {
        if let Some(window) = self.context_window {
            if window > 0 {
                self.snapshot.meta.context_pct =
                    Some((self.last_input_tokens as f64 / window as f64) * 100.0);
            }
        }
    }
}

fn tool_result_to_value(content: &ToolResultContent) -> Option<serde_json::Value> {
    match content {
        ToolResultContent::Empty => None,
        ToolResultContent::Text(text) => Some(serde_json::Value::String(text.clone())),
        ToolResultContent::Blocks(blocks) => Some(serde_json::Value::Array(blocks.clone())),
    }
}

/// Formats an API-layer error the Worker reports as an `assistant` message
/// flagged `isApiErrorMessage`. The text embeds a status and a JSON body,
/// e.g. `API Error: 400 {"error":{"message":"..."}}`.
fn format_api_error(text: &str) -> String {
    let status = text
        .split_whitespace()
        .find_map(|token| token.trim_matches(|c: char| !c.is_ascii_digit()).parse::<u32>().ok());

    let message = text
        .find('{')
        .and_then(|i| serde_json::from_str::<serde_json::Value>(&text[i..]).ok())
        .and_then(|v| {
            v.get("error")
                .and_then(|e| e.get("message"))
                .and_then(|m| m.as_str().map(str::to_string))
        })
        .unwrap_or_else(|| text.to_string());

    match status {
        Some(status) => format!("API error {status}: {message}"),
        None => format!("API error: {message}"),
    }
}

impl Message {
    fn with_synthetic(mut self) -> Self {
        self.synthetic = true;
        self
    }
}

#[cfg(test)]
#[path = "builder_tests.rs"]
mod tests;
