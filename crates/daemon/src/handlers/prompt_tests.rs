use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use bridge_core::QueuedPrompt;

use super::*;
use crate::config::Config;
use crate::state::AppState;

fn test_state(tmp: &std::path::Path, worker_program: &str) -> AppState {
    let config = Config {
        port: 0,
        grace_ms: std::time::Duration::from_secs(1),
        scan_root: tmp.to_path_buf(),
        tailscale_hostname: None,
        log_level: "info".to_string(),
        log_file: None,
        state_dir: tmp.join("state"),
        worker_program: worker_program.to_string(),
        outrider_nudge_enabled: false,
    };
    AppState::new(config, None)
}

fn prompt(text: &str) -> Json<QueuedPrompt> {
    Json(QueuedPrompt {
        text: Some(text.to_string()),
        content: None,
    })
}

#[tokio::test]
async fn creates_a_session_and_delivers_the_first_prompt() {
    let tmp = tempfile::tempdir().unwrap();
    // `cat` stays alive reading stdin, so the write the Session performs on
    // delivery always lands on an open pipe.
    let state = test_state(tmp.path(), "/bin/cat");
    std::fs::create_dir_all(tmp.path().join("proj")).unwrap();

    let response = post_prompt(State(state), Path("proj".to_string()), prompt("hi"))
        .await
        .unwrap()
        .into_response();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn queues_a_second_prompt_while_the_first_is_in_flight() {
    let tmp = tempfile::tempdir().unwrap();
    let state = test_state(tmp.path(), "/bin/cat");
    std::fs::create_dir_all(tmp.path().join("proj")).unwrap();

    let first = post_prompt(State(state.clone()), Path("proj".to_string()), prompt("q1"))
        .await
        .unwrap()
        .into_response();
    assert_eq!(first.status(), StatusCode::OK);

    let second = post_prompt(State(state), Path("proj".to_string()), prompt("q2"))
        .await
        .unwrap()
        .into_response();
    assert_eq!(second.status(), StatusCode::ACCEPTED);
}

#[tokio::test]
async fn surfaces_a_spawn_failure_as_a_router_error() {
    let tmp = tempfile::tempdir().unwrap();
    let state = test_state(tmp.path(), "/definitely/not/a/real/worker-binary");
    std::fs::create_dir_all(tmp.path().join("proj")).unwrap();

    let result = post_prompt(State(state), Path("proj".to_string()), prompt("hi")).await;
    assert!(matches!(result, Err(RouterError::Session(_))));
}
