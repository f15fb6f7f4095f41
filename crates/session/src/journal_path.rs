// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Locating the Worker's own on-disk journal.
//!
//! Journal file layout is owned by the Worker, not the bridge — the bridge
//! only reads it by a path derived from `(folder, sessionId)`. The Worker
//! keys its per-project log directory off a canonicalized, separator-
//! mangled form of the project's working directory.

use std::path::{Path, PathBuf};

/// Finds the journal file for `session_id` under `folder`'s project log
/// directory, falling back to the most recently modified `.jsonl` file in
/// that directory if no exact match exists (covers a Worker-assigned id
/// that differs slightly from what we tracked).
pub fn find_journal_path(folder: &Path, session_id: &str, claude_base: &Path) -> Option<PathBuf> {
    let project_dir = claude_base.join("projects").join(project_dir_name(folder));
    let exact = project_dir.join(format!("{session_id}.jsonl"));
    if exact.exists() {
        return Some(exact);
    }

    std::fs::read_dir(&project_dir)
        .ok()?
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.path().extension().is_some_and(|ext| ext == "jsonl"))
        .max_by_key(|entry| entry.metadata().ok().and_then(|m| m.modified().ok()))
        .map(|entry| entry.path())
}

/// The default base directory for the Worker's state: `CLAUDE_CONFIG_DIR`
/// if set, else `~/.claude`.
pub fn default_claude_base() -> PathBuf {
    std::env::var("CLAUDE_CONFIG_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| dirs::home_dir().unwrap_or_default().join(".claude"))
}

/// Converts a project path to the Worker's directory-naming convention
/// (`/`, `.` replaced with `-`), canonicalizing first since the Worker does
/// the same internally and a symlinked path would otherwise hash differently.
pub(crate) fn project_dir_name(path: &Path) -> String {
    let canonical = std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
    canonical.to_string_lossy().replace(['/', '.'], "-")
}

#[cfg(test)]
#[path = "journal_path_tests.rs"]
mod tests;
