// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn ctx(folders: &[&str], timestamp_ms: u64) -> ShutdownContext {
    ShutdownContext {
        signal: "SIGTERM".to_string(),
        timestamp_ms,
        active_turn_folders: folders.iter().map(|s| s.to_string()).collect(),
    }
}

#[test]
fn no_context_is_crash() {
    assert_eq!(classify_restart(None, "/F", 1_000), RestartCause::Crash);
}

#[test]
fn active_turn_folder_is_self_caused() {
    let context = ctx(&["/F"], 1_000);
    assert_eq!(
        classify_restart(Some(&context), "/F", 1_000),
        RestartCause::SelfCaused
    );
}

#[test]
fn other_folder_is_external() {
    let context = ctx(&["/F"], 1_000);
    assert_eq!(
        classify_restart(Some(&context), "/G", 1_000),
        RestartCause::External
    );
}

#[test]
fn stale_context_is_crash_for_any_folder() {
    let context = ctx(&["/F"], 0);
    let now = SHUTDOWN_CONTEXT_MAX_AGE_MS + 1_000;
    assert_eq!(
        classify_restart(Some(&context), "/F", now),
        RestartCause::Crash
    );
    assert_eq!(
        classify_restart(Some(&context), "/G", now),
        RestartCause::Crash
    );
}

#[test]
fn auto_resume_messages_are_distinct_per_cause() {
    let crash = auto_resume_message(RestartCause::Crash);
    let self_caused = auto_resume_message(RestartCause::SelfCaused);
    let external = auto_resume_message(RestartCause::External);
    assert_ne!(crash, self_caused);
    assert_ne!(self_caused, external);
    assert_ne!(crash, external);
}
