// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::path::Path;

use super::*;

#[test]
fn fresh_mode_appends_session_id_flag_last() {
    let argv = build_worker_argv(&ContinuationMode::Fresh("abc-123".to_string()), None);
    assert_eq!(argv.last().map(String::as_str), Some("abc-123"));
    assert_eq!(
        argv[argv.len() - 2],
        "--session-id",
        "continuation flag must be the final pair"
    );
}

#[test]
fn resume_mode_appends_resume_flag_last() {
    let argv = build_worker_argv(&ContinuationMode::Resume("prior-id".to_string()), None);
    assert_eq!(argv.last().map(String::as_str), Some("prior-id"));
    assert_eq!(argv[argv.len() - 2], "--resume");
}

#[test]
fn fixed_flags_are_present_regardless_of_mode() {
    let argv = build_worker_argv(&ContinuationMode::Fresh("x".to_string()), None);
    assert!(argv.contains(&"--output-format".to_string()));
    assert!(argv.contains(&"stream-json".to_string()));
    assert!(argv.contains(&"--disallowed-tools".to_string()));
}

#[test]
fn disallowed_tools_is_the_authoritative_negative_space() {
    let argv = build_worker_argv(&ContinuationMode::Fresh("x".to_string()), None);
    let idx = argv
        .iter()
        .position(|a| a == "--disallowed-tools")
        .expect("flag present");
    let value = &argv[idx + 1];
    for tool in DISALLOWED_TOOLS {
        assert!(value.split(',').any(|t| t == *tool));
    }
}

#[test]
fn mcp_config_flag_omitted_when_not_configured() {
    let argv = build_worker_argv(&ContinuationMode::Fresh("x".to_string()), None);
    assert!(!argv.contains(&"--mcp-config".to_string()));
}

#[test]
fn mcp_config_flag_present_before_the_continuation_flag() {
    let argv = build_worker_argv(
        &ContinuationMode::Fresh("x".to_string()),
        Some(Path::new("/etc/bridge/mcp.json")),
    );
    let idx = argv
        .iter()
        .position(|a| a == "--mcp-config")
        .expect("flag present");
    assert_eq!(argv[idx + 1], "/etc/bridge/mcp.json");
    assert_eq!(argv[argv.len() - 2], "--session-id", "continuation flag must stay last");
}

#[test]
fn stripped_env_vars_cover_nested_invocation_guard() {
    assert!(STRIPPED_ENV_VARS.contains(&"CLAUDECODE"));
}
