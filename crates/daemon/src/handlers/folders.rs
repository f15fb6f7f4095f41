// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `GET /folders` — the lobby's candidate-folder listing.

use axum::extract::State;
use axum::Json;
use bridge_core::InProcess;
use bridge_sse::FolderInfo;
use serde::Serialize;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct FoldersResponse {
    pub folders: Vec<FolderInfo>,
}

pub async fn get_folders(State(state): State<AppState>) -> Json<FoldersResponse> {
    Json(FoldersResponse {
        folders: scan(&state).await,
    })
}

/// Lists the scan root's immediate subdirectories, each annotated with
/// whether it already has something resumable on disk (or in process).
pub async fn scan(state: &AppState) -> Vec<FolderInfo> {
    let mut entries = match tokio::fs::read_dir(&state.config.scan_root).await {
        Ok(entries) => entries,
        Err(_) => return Vec::new(),
    };

    let claude_base = state.session_config().claude_base;
    let mut folders = Vec::new();
    while let Ok(Some(entry)) = entries.next_entry().await {
        let path = entry.path();
        let is_dir = entry.file_type().await.map(|ft| ft.is_dir()).unwrap_or(false);
        if !is_dir {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();

        let in_process = state.registry.in_process(&path).await;
        let resumable = resumable_for(&path, &claude_base, &state.config.state_dir, in_process.as_ref(), &state).await;

        folders.push(FolderInfo {
            name,
            path: path.to_string_lossy().into_owned(),
            resumable: Some(resumable),
        });
    }

    folders.sort_by(|a, b| a.name.cmp(&b.name));
    folders
}

async fn resumable_for(
    path: &std::path::Path,
    claude_base: &std::path::Path,
    state_dir: &std::path::Path,
    in_process: Option<&InProcess>,
    state: &AppState,
) -> bool {
    let resolution = bridge_session::resolve_for_folder(
        path,
        claude_base,
        state_dir,
        in_process,
        state.id_gen.as_ref(),
    )
    .await;
    resolution.resumable
}

#[cfg(test)]
#[path = "folders_tests.rs"]
mod tests;
