// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `POST /exit/:folder` — write the exit marker, kill the Worker, destroy
//! the Session. A no-op 200 if the folder has no live Session at all.

use axum::extract::{Path, State};
use axum::http::StatusCode;

use crate::error::RouterError;
use crate::folder::resolve_folder;
use crate::state::AppState;

pub async fn post_exit(
    State(state): State<AppState>,
    Path(folder_raw): Path<String>,
) -> Result<StatusCode, RouterError> {
    let folder = resolve_folder(&state, &folder_raw)?;
    if let Some(handle) = state.registry.get(&folder).await {
        handle.exit().await?;
    }
    Ok(StatusCode::OK)
}

#[cfg(test)]
#[path = "exit_tests.rs"]
mod tests;
