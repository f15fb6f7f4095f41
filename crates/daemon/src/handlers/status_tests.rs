use axum::extract::State;

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

#[tokio::test]
async fn reports_zero_sessions_and_no_recent_events_fresh() {
    let tmp = tempfile::tempdir().unwrap();
    let state = test_state(tmp.path());

    let Json(response) = get_status(State(state)).await;
    assert_eq!(response.session_count, 0);
    assert!(response.recent_events.is_empty());
}

#[tokio::test]
async fn surfaces_recorded_events() {
    let tmp = tempfile::tempdir().unwrap();
    let state = test_state(tmp.path());
    state.record_event("GET", "/folders", 200);
    state.record_event("POST", "/prompt/proj", 200);

    let Json(response) = get_status(State(state)).await;
    assert_eq!(response.recent_events.len(), 2);
    assert_eq!(response.recent_events[0].path, "/folders");
}
