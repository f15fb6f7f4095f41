use tempfile::TempDir;

use super::*;

#[test]
fn finds_exact_session_id_match() {
    let claude_base = TempDir::new().unwrap();
    let workspace = TempDir::new().unwrap();

    let log_dir = claude_base
        .path()
        .join("projects")
        .join(project_dir_name(workspace.path()));
    std::fs::create_dir_all(&log_dir).unwrap();
    std::fs::write(log_dir.join("abc123.jsonl"), "{}").unwrap();

    let found = find_journal_path(workspace.path(), "abc123", claude_base.path());
    assert_eq!(found, Some(log_dir.join("abc123.jsonl")));
}

#[test]
fn falls_back_to_most_recent_jsonl() {
    let claude_base = TempDir::new().unwrap();
    let workspace = TempDir::new().unwrap();

    let log_dir = claude_base
        .path()
        .join("projects")
        .join(project_dir_name(workspace.path()));
    std::fs::create_dir_all(&log_dir).unwrap();
    std::fs::write(log_dir.join("old.jsonl"), "{}").unwrap();
    std::thread::sleep(std::time::Duration::from_millis(10));
    std::fs::write(log_dir.join("new.jsonl"), "{}").unwrap();

    let found = find_journal_path(workspace.path(), "missing-id", claude_base.path());
    assert_eq!(found, Some(log_dir.join("new.jsonl")));
}

#[test]
fn different_workspace_path_misses_entirely() {
    let claude_base = TempDir::new().unwrap();
    let workspace = TempDir::new().unwrap();
    let other = TempDir::new().unwrap();

    let log_dir = claude_base
        .path()
        .join("projects")
        .join(project_dir_name(workspace.path()));
    std::fs::create_dir_all(&log_dir).unwrap();
    std::fs::write(log_dir.join("abc123.jsonl"), "{}").unwrap();

    assert!(find_journal_path(other.path(), "abc123", claude_base.path()).is_none());
}
