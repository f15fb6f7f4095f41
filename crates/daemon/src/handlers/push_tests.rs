use axum::extract::State;
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use bridge_core::ClientId;

use super::*;
use crate::config::Config;
use crate::state::AppState;

fn test_state(tmp: &std::path::Path) -> AppState {
    let config = Config {
        port: 0,
        grace_ms: std::time::Duration::from_secs(1),
        scan_root: tmp.to_path_buf(),
        tailscale_hostname: None,
        log_level: "info".to_string(),
        log_file: None,
        state_dir: tmp.join("state"),
        worker_program: "claude".to_string(),
        outrider_nudge_enabled: false,
    };
    AppState::new(config, None)
}

fn headers_with_token(token: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(PUSH_TOKEN_HEADER, HeaderValue::from_str(token).unwrap());
    headers
}

#[tokio::test]
async fn subscribe_accepts_a_token_minted_for_a_live_connection() {
    let tmp = tempfile::tempdir().unwrap();
    let state = test_state(tmp.path());
    let connection = state.hub.connect(ClientId::new("client-1"), false, None);

    let result = post_subscribe(State(state), headers_with_token(&connection.push_token)).await;
    assert_eq!(result.unwrap(), StatusCode::OK);
}

#[tokio::test]
async fn subscribe_rejects_an_unknown_token() {
    let tmp = tempfile::tempdir().unwrap();
    let state = test_state(tmp.path());

    let result = post_subscribe(State(state), headers_with_token("not-a-real-token")).await;
    assert!(matches!(result, Err(RouterError::Unauthorized)));
}

#[tokio::test]
async fn subscribe_rejects_a_missing_token_header() {
    let tmp = tempfile::tempdir().unwrap();
    let state = test_state(tmp.path());

    let result = post_subscribe(State(state), HeaderMap::new()).await;
    assert!(matches!(result, Err(RouterError::Unauthorized)));
}

#[tokio::test]
async fn unsubscribe_accepts_a_valid_token() {
    let tmp = tempfile::tempdir().unwrap();
    let state = test_state(tmp.path());
    let connection = state.hub.connect(ClientId::new("client-1"), false, None);

    let result = post_unsubscribe(State(state), headers_with_token(&connection.push_token)).await;
    assert_eq!(result.unwrap(), StatusCode::OK);
}
