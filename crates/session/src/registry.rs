// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The in-process map of live Sessions, one per folder.
//!
//! Enforces the one-Session-per-folder invariant: a second `ensure` for a
//! folder that already has a live actor returns the existing handle rather
//! than spawning a competing Worker against the same journal.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use bridge_core::InProcess;
use tokio::sync::Mutex;

use crate::handle::SessionHandle;

#[derive(Clone, Default)]
pub struct SessionRegistry {
    sessions: Arc<Mutex<HashMap<PathBuf, SessionHandle>>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, folder: &Path) -> Option<SessionHandle> {
        self.sessions.lock().await.get(folder).cloned()
    }

    /// The in-process resolution signal for `folder`, for
    /// `bridge_session::resolve_io::resolve_for_folder`.
    pub async fn in_process(&self, folder: &Path) -> Option<InProcess> {
        self.get(folder).await.map(|handle| InProcess {
            session_id: handle.id().as_str().to_string(),
            resumable: handle.resumable(),
        })
    }

    pub async fn insert(&self, folder: PathBuf, handle: SessionHandle) {
        self.sessions.lock().await.insert(folder, handle);
    }

    pub async fn remove(&self, folder: &Path) {
        self.sessions.lock().await.remove(folder);
    }

    pub async fn folders(&self) -> Vec<PathBuf> {
        self.sessions.lock().await.keys().cloned().collect()
    }

    pub async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// A snapshot of every live `(folder, handle)` pair, for the shutdown
    /// path to sweep over — iterating the map directly would hold the lock
    /// across each handle's own async round-trip.
    pub async fn all(&self) -> Vec<(PathBuf, SessionHandle)> {
        self.sessions
            .lock()
            .await
            .iter()
            .map(|(folder, handle)| (folder.clone(), handle.clone()))
            .collect()
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
