// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Filesystem-facing session resolution.
//!
//! `bridge_core::resolve_session` is pure — it only combines whatever
//! signals it is handed. This module is where those signals actually come
//! from: the Worker's own project journal directory, and a bridge-owned
//! exit-marker file.
//!
//! The handoff file's exact shape is not something this codebase's Worker
//! binary documents anywhere reachable from here; `.handoff.json` next to
//! the journal, holding `{"sessionId": "..."}`, is this crate's own
//! convention, chosen to mirror the journal's naming and looked up the same
//! way. A Worker release that never writes one simply means `read_handoff`
//! always returns `None`, which folds into the safe "resume" branch of
//! `resolve_session` rather than misbehaving.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use bridge_core::{
    discard_stale_handoff, resolve_session, Handoff, IdGen, InProcess, JournalRecord, Resolution,
};
use serde::Deserialize;

use crate::journal_path::project_dir_name;

const HANDOFF_SUFFIX: &str = ".handoff.json";

#[derive(Debug, Deserialize)]
struct HandoffFile {
    #[serde(rename = "sessionId")]
    session_id: String,
}

fn epoch_ms_of(time: SystemTime) -> u64 {
    time.duration_since(SystemTime::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// The most recently modified `.jsonl` record in `folder`'s project
/// directory, whatever its session id — unlike
/// [`crate::journal_path::find_journal_path`], which looks up one already-
/// known id, resolution needs to discover the id in the first place.
pub fn latest_journal_record(folder: &Path, claude_base: &Path) -> Option<JournalRecord> {
    let project_dir = claude_base.join("projects").join(project_dir_name(folder));
    let entry = std::fs::read_dir(&project_dir)
        .ok()?
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.path().extension().is_some_and(|ext| ext == "jsonl"))
        .max_by_key(|entry| entry.metadata().ok().and_then(|m| m.modified().ok()))?;

    let session_id = entry.path().file_stem()?.to_string_lossy().into_owned();
    let modified_ms = epoch_ms_of(entry.metadata().ok()?.modified().ok()?);
    Some(JournalRecord {
        session_id,
        modified_ms,
    })
}

/// The most recently modified handoff file in `folder`'s project directory.
pub fn read_handoff(folder: &Path, claude_base: &Path) -> Option<Handoff> {
    let project_dir = claude_base.join("projects").join(project_dir_name(folder));
    let entry = std::fs::read_dir(&project_dir)
        .ok()?
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_name().to_string_lossy().ends_with(HANDOFF_SUFFIX))
        .max_by_key(|entry| entry.metadata().ok().and_then(|m| m.modified().ok()))?;

    let body = std::fs::read_to_string(entry.path()).ok()?;
    let parsed: HandoffFile = serde_json::from_str(&body).ok()?;
    let modified_ms = epoch_ms_of(entry.metadata().ok()?.modified().ok()?);
    Some(Handoff {
        session_id: parsed.session_id,
        modified_ms,
    })
}

/// Path to the exit marker for a given session id, under the bridge's own
/// state directory. Presence-only signal — an empty file touched when a
/// client sends an explicit `/exit`.
pub fn exit_marker_path(state_dir: &Path, session_id: &str) -> PathBuf {
    state_dir.join("exit-markers").join(session_id)
}

pub async fn exit_marker_present(state_dir: &Path, session_id: &str) -> bool {
    tokio::fs::try_exists(exit_marker_path(state_dir, session_id))
        .await
        .unwrap_or(false)
}

/// Marks `session_id` as deliberately closed, so the next resolution for
/// this folder starts fresh instead of resuming.
pub async fn write_exit_marker(state_dir: &Path, session_id: &str) -> std::io::Result<()> {
    let path = exit_marker_path(state_dir, session_id);
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, b"").await
}

/// Resolves the session id and resumability for a folder by combining the
/// in-process registry (if the caller already knows of a running Session)
/// with the on-disk journal, handoff, and exit-marker signals.
pub async fn resolve_for_folder(
    folder: &Path,
    claude_base: &Path,
    state_dir: &Path,
    in_process: Option<&InProcess>,
    id_gen: &dyn IdGen,
) -> Resolution {
    if in_process.is_some() {
        return resolve_session(in_process, None, None, false, id_gen);
    }

    let journal = latest_journal_record(folder, claude_base);
    let exit_marker_present = match &journal {
        Some(j) => exit_marker_present(state_dir, &j.session_id).await,
        None => false,
    };
    let handoff = discard_stale_handoff(journal.as_ref(), read_handoff(folder, claude_base));

    resolve_session(
        None,
        journal.as_ref(),
        handoff.as_ref(),
        exit_marker_present,
        id_gen,
    )
}

#[cfg(test)]
#[path = "resolve_io_tests.rs"]
mod tests;
