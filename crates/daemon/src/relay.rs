// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Relays one Session's broadcast stream into the SSE hub, and keeps the
//! registry and the persisted active-Worker record list in sync with the
//! Session's lifecycle.
//!
//! `bridge-session` knows nothing of `bridge-sse` or `bridge-storage` —
//! this is the one place those three crates meet, matching the teacher's
//! own design note that the daemon binary is where otherwise-independent
//! components get wired together.

use std::path::PathBuf;

use bridge_core::Clock;
use bridge_session::{SessionBroadcast, SessionHandle};
use bridge_storage::WorkerRecord;
use tracing::debug;

use crate::state::AppState;

/// Spawns the background task that drives one folder's relay for as long
/// as its Session lives. Fire-and-forget: the task exits on its own once
/// the Session broadcasts `Exited` or its channel closes.
pub fn spawn(state: AppState, folder: PathBuf, handle: SessionHandle) {
    tokio::spawn(async move {
        let mut events = handle.subscribe();
        loop {
            let event = match events.recv().await {
                Ok(event) => event,
                Err(tokio::sync::broadcast::error::RecvError::Lagged(skipped)) => {
                    debug!(folder = %folder.display(), skipped, "relay lagged behind session broadcast");
                    continue;
                }
                Err(tokio::sync::broadcast::error::RecvError::Closed) => {
                    state.registry.remove(&folder).await;
                    state.records.remove(handle.id().as_str()).await;
                    break;
                }
            };

            match event {
                SessionBroadcast::Delta(delta) => state.hub.broadcast_delta(&folder, &delta).await,
                SessionBroadcast::State(snapshot) => {
                    state.hub.broadcast_state(&folder, &snapshot).await
                }
                SessionBroadcast::TurnComplete(_) => {}
                SessionBroadcast::Error(reason) => {
                    debug!(folder = %folder.display(), reason, "session reported an error");
                }
                SessionBroadcast::WorkerSpawned { pid } => {
                    state
                        .records
                        .upsert(WorkerRecord {
                            session_id: handle.id().as_str().to_string(),
                            folder_path: folder.to_string_lossy().into_owned(),
                            pid,
                            spawned_at_ms: bridge_core::SystemClock.epoch_ms(),
                        })
                        .await;
                }
                SessionBroadcast::Exited => {
                    state.registry.remove(&folder).await;
                    state.records.remove(handle.id().as_str()).await;
                    break;
                }
            }
        }
    });
}
