// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Errors surfaced by the Session supervisor.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("worker is not running")]
    WorkerNotRunning,
    #[error("failed to spawn worker: {0}")]
    Spawn(#[from] bridge_worker::WorkerError),
    #[error("session actor is gone")]
    ActorGone,
    #[error("failed to write stdin message: {0}")]
    StdinWrite(bridge_worker::WorkerError),
    #[error("failed to encode stdin message: {0}")]
    Encode(#[from] serde_json::Error),
}
