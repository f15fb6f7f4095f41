// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Errors from spawning and talking to the Worker subprocess.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("failed to spawn worker: {0}")]
    Spawn(#[source] std::io::Error),
    #[error("worker stdio handle unavailable")]
    MissingStdio,
    #[error("failed to write to worker stdin: {0}")]
    StdinWrite(#[source] std::io::Error),
}
