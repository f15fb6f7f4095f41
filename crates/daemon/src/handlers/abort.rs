// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `POST /abort/:folder` — kill the Worker with escalation, keep the Session.

use axum::extract::{Path, State};
use axum::http::StatusCode;

use crate::error::RouterError;
use crate::folder::resolve_folder;
use crate::state::AppState;

pub async fn post_abort(
    State(state): State<AppState>,
    Path(folder_raw): Path<String>,
) -> Result<StatusCode, RouterError> {
    let folder = resolve_folder(&state, &folder_raw)?;
    let handle = state.registry.get(&folder).await.ok_or(RouterError::NotFound)?;
    handle.abort().await?;
    Ok(StatusCode::OK)
}

#[cfg(test)]
#[path = "abort_tests.rs"]
mod tests;
