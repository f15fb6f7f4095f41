// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `POST /session/:folder` — resolve-latest, force-fresh, or explicit-resume.

use std::path::Path as StdPath;
use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use bridge_core::{AgentSessionId, Clock, ClientId, IdGen};
use bridge_session::{SessionConfig, SessionHandle};
use serde::{Deserialize, Serialize};

use crate::error::RouterError;
use crate::folder::resolve_folder;
use crate::relay;
use crate::state::AppState;

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct SessionRequest {
    /// Omit = resolve-latest; `"new"` = force fresh; any other string is a
    /// specific id to resume (tearing down a different live Session first).
    #[serde(default)]
    pub session_id: Option<String>,
    /// The calling SSE client, if it wants its stream bound to this folder
    /// (the "connectFolder" step — an SSE client starts in the lobby and
    /// moves to a folder by resolving a Session against it).
    #[serde(default)]
    pub client_id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub session_id: String,
    pub folder: String,
    pub resumable: bool,
}

pub async fn post_session(
    State(state): State<AppState>,
    Path(folder_raw): Path<String>,
    Json(body): Json<SessionRequest>,
) -> Result<Json<SessionResponse>, RouterError> {
    let folder = resolve_folder(&state, &folder_raw)?;
    let existing = state.registry.get(&folder).await;

    let handle = match body.session_id.as_deref() {
        Some("new") => {
            teardown(&state, &folder, existing).await?;
            let id = AgentSessionId::new(state.id_gen.next());
            spawn_and_register(&state, &folder, id, false).await
        }
        Some(explicit) => match existing {
            Some(handle) if handle.id().as_str() == explicit => handle,
            existing => {
                teardown(&state, &folder, existing).await?;
                let id = AgentSessionId::new(explicit.to_string());
                spawn_and_register(&state, &folder, id, true).await
            }
        },
        None => resolve_or_create(&state, &folder, existing).await,
    };

    if let Some(client_id) = body.client_id.as_deref() {
        let client_id = ClientId::new(client_id);
        state.hub.bind(&client_id, Some(&folder));
        handle.client_attached();
    }

    Ok(Json(SessionResponse {
        session_id: handle.id().as_str().to_string(),
        folder: folder.to_string_lossy().into_owned(),
        resumable: handle.resumable(),
    }))
}

/// Tears down a Session being replaced by a different requested id.
/// `exit()` writes its exit marker, so the replaced id can never be
/// auto-resumed later by accident.
async fn teardown(
    state: &AppState,
    folder: &StdPath,
    existing: Option<SessionHandle>,
) -> Result<(), RouterError> {
    if let Some(handle) = existing {
        handle.exit().await?;
        state.registry.remove(folder).await;
    }
    Ok(())
}

/// Resolve-latest: reuse an in-process Session, or work out from the
/// on-disk journal/handoff/exit-marker signals whether this folder should
/// come back fresh or resumed. Shared by `POST /session` (explicit
/// resolve-latest) and `POST /prompt` (implicit — a prompt against a folder
/// with no live Session simply creates one first).
pub(crate) async fn resolve_or_create(
    state: &AppState,
    folder: &StdPath,
    existing: Option<SessionHandle>,
) -> SessionHandle {
    if let Some(handle) = existing {
        return handle;
    }
    let resolution = bridge_session::resolve_for_folder(
        folder,
        &state.session_config().claude_base,
        &state.config.state_dir,
        None,
        state.id_gen.as_ref(),
    )
    .await;
    let id = AgentSessionId::new(resolution.session_id);
    spawn_and_register(state, folder, id, resolution.resumable).await
}

async fn spawn_and_register(
    state: &AppState,
    folder: &StdPath,
    id: AgentSessionId,
    resumable: bool,
) -> SessionHandle {
    let auto_resume = resumable.then(|| auto_resume_message(state, folder)).flatten();
    let config: SessionConfig = state.session_config();
    let handle = bridge_session::spawn(bridge_session::SpawnOptions {
        id,
        folder: folder.to_path_buf(),
        resumable,
        config,
        push: Arc::clone(&state.push),
        auto_resume,
    });
    state.registry.insert(folder.to_path_buf(), handle.clone()).await;
    relay::spawn(state.clone(), folder.to_path_buf(), handle.clone());
    handle
}

fn auto_resume_message(state: &AppState, folder: &StdPath) -> Option<String> {
    let context = state.shutdown_context.as_ref().as_ref()?;
    let folder_str = folder.to_string_lossy();
    let now_ms = bridge_core::SystemClock.epoch_ms();
    let cause = bridge_core::classify_restart(Some(context), &folder_str, now_ms);
    Some(bridge_core::auto_resume_message(cause).to_string())
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
