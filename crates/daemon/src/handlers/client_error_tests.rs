use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use axum::extract::{ConnectInfo, State};
use axum::http::StatusCode;
use axum::Json;

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

fn addr() -> SocketAddr {
    SocketAddr::new(IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1)), 9_000)
}

#[tokio::test]
async fn accepts_a_report() {
    let tmp = tempfile::tempdir().unwrap();
    let state = test_state(tmp.path());
    let report = serde_json::json!({"message": "boom"});

    let result = post_client_error(State(state), ConnectInfo(addr()), Json(report)).await;
    assert_eq!(result.unwrap(), StatusCode::ACCEPTED);
}

#[tokio::test]
async fn rate_limits_past_the_per_address_cap() {
    let tmp = tempfile::tempdir().unwrap();
    let state = test_state(tmp.path());

    // Matches `rate_limit::LIMIT`, which isn't exported — this loop fails
    // loudly (a passing request where a 429 was expected) if that ever
    // drifts out of sync.
    for _ in 0..10 {
        let result = post_client_error(
            State(state.clone()),
            ConnectInfo(addr()),
            Json(serde_json::json!({})),
        )
        .await;
        assert!(result.is_ok());
    }

    let result = post_client_error(State(state), ConnectInfo(addr()), Json(serde_json::json!({}))).await;
    assert!(matches!(result, Err(RouterError::RateLimited)));
}
