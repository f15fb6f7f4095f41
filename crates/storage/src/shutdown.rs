// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! One-shot persistence of [`bridge_core::ShutdownContext`].
//!
//! Written exactly once, at graceful shutdown. Loaded exactly once, on the
//! next startup, and then deleted regardless of whether it parsed — its
//! mere presence on disk means "the previous shutdown was graceful"; a
//! malformed or missing file both mean "treat this as a crash", which
//! [`bridge_core::classify_restart`] already does for `None`.

use std::path::{Path, PathBuf};

use bridge_core::ShutdownContext;
use tracing::warn;

use crate::error::StorageError;

pub const SHUTDOWN_CONTEXT_FILENAME: &str = "shutdown.json";

pub fn shutdown_context_path(state_dir: &Path) -> PathBuf {
    state_dir.join(SHUTDOWN_CONTEXT_FILENAME)
}

/// Writes the shutdown context, creating the state directory if needed.
pub async fn write_shutdown_context(
    state_dir: &Path,
    context: &ShutdownContext,
) -> Result<(), StorageError> {
    let path = shutdown_context_path(state_dir);
    tokio::fs::create_dir_all(state_dir)
        .await
        .map_err(|source| StorageError::Write {
            path: state_dir.to_path_buf(),
            source,
        })?;
    let body = serde_json::to_vec_pretty(context)?;
    tokio::fs::write(&path, body)
        .await
        .map_err(|source| StorageError::Write { path, source })
}

/// Loads and deletes the shutdown context file, if present. A malformed
/// file is logged and treated the same as a missing one — deleted, `None`
/// returned — so one corrupt write never wedges every future startup into
/// "crash" classification forever by surviving on disk.
pub async fn take_shutdown_context(state_dir: &Path) -> Option<ShutdownContext> {
    let path = shutdown_context_path(state_dir);
    let body = tokio::fs::read(&path).await.ok()?;
    let _ = tokio::fs::remove_file(&path).await;

    match serde_json::from_slice(&body) {
        Ok(context) => Some(context),
        Err(err) => {
            warn!(path = %path.display(), error = %err, "malformed shutdown context, discarding");
            None
        }
    }
}

#[cfg(test)]
#[path = "shutdown_tests.rs"]
mod tests;
