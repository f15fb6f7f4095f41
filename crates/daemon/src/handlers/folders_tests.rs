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
async fn lists_subdirectories_of_the_scan_root_sorted_by_name() {
    let tmp = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(tmp.path().join("zebra")).unwrap();
    std::fs::create_dir_all(tmp.path().join("alpha")).unwrap();
    std::fs::write(tmp.path().join("not-a-dir.txt"), b"x").unwrap();
    let state = test_state(tmp.path());

    let Json(response) = get_folders(State(state)).await;
    let names: Vec<&str> = response.folders.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["alpha", "zebra"]);
}

#[tokio::test]
async fn a_folder_with_no_journal_is_not_resumable() {
    let tmp = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(tmp.path().join("proj")).unwrap();
    let state = test_state(tmp.path());

    let Json(response) = get_folders(State(state)).await;
    let proj = response.folders.iter().find(|f| f.name == "proj").unwrap();
    assert_eq!(proj.resumable, Some(false));
}

#[tokio::test]
async fn an_empty_scan_root_yields_no_folders() {
    let tmp = tempfile::tempdir().unwrap();
    let state = test_state(tmp.path());

    let Json(response) = get_folders(State(state)).await;
    assert!(response.folders.is_empty());
}
