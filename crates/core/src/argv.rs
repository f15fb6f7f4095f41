// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Worker spawn argument-vector construction.

use std::path::Path;

/// Tools the Worker is permitted to use without per-call confirmation.
/// Broad on purpose: narrow enough allow-lists leak through the Worker's own
/// subagent propagation and create a false sense of sandboxing.
const ALLOWED_TOOLS: &[&str] = &[
    "Bash",
    "Read",
    "Write",
    "Edit",
    "Glob",
    "Grep",
    "WebFetch",
    "WebSearch",
    "TodoWrite",
    "AskUserQuestion",
    "NotebookEdit",
];

/// Tools withheld regardless of the allow-list above — the authoritative
/// negative space.
const DISALLOWED_TOOLS: &[&str] = &["KillShell", "BashOutput"];

const SYSTEM_PROMPT_APPEND: &str = "You are being driven from a mobile client over a bridged stdio protocol. There is no interactive terminal on the other end. The BashOutput tool is unavailable by design; use Bash's own output instead.";

/// How to continue (or start) the Worker's underlying conversation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContinuationMode {
    /// Resume a previously-closed conversation by its prior id.
    Resume(String),
    /// Start a brand new conversation under this id.
    Fresh(String),
}

/// Builds the Worker's full argument vector (excluding argv[0]).
///
/// Fixed flags first, identical across every spawn; the continuation flag
/// (`--resume` or `--session-id`) always comes last so it is easy to spot
/// in process listings. `mcp_config` is the path to the bridge's MCP server
/// config file, if one is configured — omitted entirely rather than passed
/// empty when there is none.
pub fn build_worker_argv(mode: &ContinuationMode, mcp_config: Option<&Path>) -> Vec<String> {
    let mut argv = vec![
        "--print".to_string(),
        "--verbose".to_string(),
        "--output-format".to_string(),
        "stream-json".to_string(),
        "--input-format".to_string(),
        "stream-json".to_string(),
        "--include-partial-messages".to_string(),
        "--replay-user-messages".to_string(),
        "--permission-mode".to_string(),
        "acceptEdits".to_string(),
        "--allowed-tools".to_string(),
        ALLOWED_TOOLS.join(","),
        "--disallowed-tools".to_string(),
        DISALLOWED_TOOLS.join(","),
        "--append-system-prompt".to_string(),
        SYSTEM_PROMPT_APPEND.to_string(),
    ];

    if let Some(path) = mcp_config {
        argv.push("--mcp-config".to_string());
        argv.push(path.to_string_lossy().into_owned());
    }

    match mode {
        ContinuationMode::Resume(id) => {
            argv.push("--resume".to_string());
            argv.push(id.clone());
        }
        ContinuationMode::Fresh(id) => {
            argv.push("--session-id".to_string());
            argv.push(id.clone());
        }
    }

    argv
}

/// Environment variables stripped from the bridge's own environment before
/// spawning the Worker, so it does not mistake itself for a nested instance.
pub const STRIPPED_ENV_VARS: &[&str] = &["CLAUDECODE", "CLAUDE_CODE_ENTRYPOINT"];

#[cfg(test)]
#[path = "argv_tests.rs"]
mod tests;
