// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! OrphanReaper + ShutdownContext persistence (spec §4.5).
//!
//! Three small JSON files under the bridge's state directory, each written
//! through a debounced whole-file rewrite rather than an append-only log —
//! this system has no snapshot/replay durability requirement the way the
//! teacher's job-queue WAL does, just "don't lose the last-known-good copy
//! across a graceful restart".

mod debounce;
mod error;
mod reaper;
mod records;
mod shutdown;

pub use debounce::Debouncer;
pub use error::StorageError;
pub use reaper::{reap_orphans, ReapSummary, MAX_RECORD_AGE_MS};
pub use records::{
    delete_worker_records, load_worker_records, worker_records_path, WorkerRecord,
    WorkerRecordStore, WORKER_RECORDS_FILENAME, WORKER_RECORDS_FLUSH_DELAY,
};
pub use shutdown::{
    shutdown_context_path, take_shutdown_context, write_shutdown_context,
    SHUTDOWN_CONTEXT_FILENAME,
};
