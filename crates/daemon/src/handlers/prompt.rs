// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `POST /prompt/:folder` — deliver or queue a prompt, creating a Session
//! for the folder first if none is live (the resolve-latest path, not a
//! 404 — a prompt is how a brand new folder's conversation gets started).

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use bridge_core::QueuedPrompt;
use bridge_session::PromptOutcome;
use serde::Serialize;

use crate::error::RouterError;
use crate::folder::resolve_folder;
use crate::handlers::session::resolve_or_create;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct Delivered {
    pub delivered: bool,
}

#[derive(Debug, Serialize)]
pub struct Queued {
    pub queued: bool,
    pub position: usize,
}

pub async fn post_prompt(
    State(state): State<AppState>,
    Path(folder_raw): Path<String>,
    Json(prompt): Json<QueuedPrompt>,
) -> Result<Response, RouterError> {
    let folder = resolve_folder(&state, &folder_raw)?;
    let existing = state.registry.get(&folder).await;
    let handle = resolve_or_create(&state, &folder, existing).await;

    let outcome = handle.deliver_prompt(prompt).await?;
    Ok(match outcome {
        PromptOutcome::Delivered => (StatusCode::OK, Json(Delivered { delivered: true })).into_response(),
        PromptOutcome::Queued { position } => (
            StatusCode::ACCEPTED,
            Json(Queued {
                queued: true,
                position,
            }),
        )
            .into_response(),
    })
}

#[cfg(test)]
#[path = "prompt_tests.rs"]
mod tests;
