// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Persisted active-Worker records, for the orphan reaper to consult on
//! the next startup.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::warn;

use crate::debounce::Debouncer;
use crate::error::StorageError;

pub const WORKER_RECORDS_FILENAME: &str = "sse-sessions.json";

/// Debounce window between a registry change and the write hitting disk.
pub const WORKER_RECORDS_FLUSH_DELAY: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerRecord {
    pub session_id: String,
    pub folder_path: String,
    pub pid: u32,
    pub spawned_at_ms: u64,
}

pub fn worker_records_path(state_dir: &Path) -> PathBuf {
    state_dir.join(WORKER_RECORDS_FILENAME)
}

/// Reads the persisted record list. Missing file is treated as empty;
/// malformed contents are logged and treated as empty rather than failing
/// startup over a corrupt diagnostics file.
pub async fn load_worker_records(state_dir: &Path) -> Vec<WorkerRecord> {
    let path = worker_records_path(state_dir);
    let Ok(body) = tokio::fs::read(&path).await else {
        return Vec::new();
    };
    match serde_json::from_slice(&body) {
        Ok(records) => records,
        Err(err) => {
            warn!(path = %path.display(), error = %err, "malformed worker records file, ignoring");
            Vec::new()
        }
    }
}

pub async fn delete_worker_records(state_dir: &Path) {
    let _ = tokio::fs::remove_file(worker_records_path(state_dir)).await;
}

/// The live, in-memory registry of active-Worker records, with a debounced
/// writer keeping the on-disk copy in sync.
///
/// One instance lives for the bridge process's whole lifetime; every
/// Session spawn/exit calls [`WorkerRecordStore::upsert`] /
/// [`WorkerRecordStore::remove`], each of which schedules (but does not
/// block on) a flush.
#[derive(Clone)]
pub struct WorkerRecordStore {
    state_dir: PathBuf,
    records: Arc<Mutex<Vec<WorkerRecord>>>,
    debouncer: Debouncer,
}

impl WorkerRecordStore {
    pub fn new(state_dir: PathBuf) -> Self {
        Self {
            state_dir,
            records: Arc::new(Mutex::new(Vec::new())),
            debouncer: Debouncer::new(WORKER_RECORDS_FLUSH_DELAY),
        }
    }

    pub async fn upsert(&self, record: WorkerRecord) {
        {
            let mut records = self.records.lock().await;
            records.retain(|r| r.session_id != record.session_id);
            records.push(record);
        }
        self.schedule_flush();
    }

    pub async fn remove(&self, session_id: &str) {
        {
            let mut records = self.records.lock().await;
            records.retain(|r| r.session_id != session_id);
        }
        self.schedule_flush();
    }

    pub async fn snapshot(&self) -> Vec<WorkerRecord> {
        self.records.lock().await.clone()
    }

    /// Writes the current snapshot immediately, bypassing the debounce
    /// window — used on graceful shutdown, where the process is about to
    /// exit and cannot wait out the normal delay.
    pub async fn flush_now(&self) -> Result<(), StorageError> {
        let records = self.snapshot().await;
        write_worker_records(&self.state_dir, &records).await
    }

    fn schedule_flush(&self) {
        let state_dir = self.state_dir.clone();
        let records = self.records.clone();
        self.debouncer.schedule(move || async move {
            let snapshot = records.lock().await.clone();
            if let Err(err) = write_worker_records(&state_dir, &snapshot).await {
                warn!(error = %err, "failed to persist worker records");
            }
        });
    }
}

async fn write_worker_records(
    state_dir: &Path,
    records: &[WorkerRecord],
) -> Result<(), StorageError> {
    tokio::fs::create_dir_all(state_dir)
        .await
        .map_err(|source| StorageError::Write {
            path: state_dir.to_path_buf(),
            source,
        })?;
    let path = worker_records_path(state_dir);
    let body = serde_json::to_vec_pretty(records)?;
    tokio::fs::write(&path, body)
        .await
        .map_err(|source| StorageError::Write { path, source })
}

#[cfg(test)]
#[path = "records_tests.rs"]
mod tests;
