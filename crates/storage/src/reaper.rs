// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The startup reap sweep: kill any Worker that survived a previous bridge
//! instance's shutdown.
//!
//! Runs exactly once at startup, before the registry is otherwise touched.
//! Descendant pids matter because process trees detach under the "kill the
//! cgroup leader but not children" mode some service managers use —
//! reparenting to init after the parent dies produces zombies that still
//! hold tty/fd resources, so every descendant gets the same kill signal as
//! the recorded pid.

use bridge_core::Clock;
use bridge_worker::{descendant_pids, is_alive, kill_with_escalation, KILL_ESCALATION_GRACE};
use std::path::Path;
use tracing::info;

use crate::records::{delete_worker_records, load_worker_records, WorkerRecord};

/// Records older than this are assumed to belong to a process that no
/// longer exists (pids wrap around); skip the liveness probe entirely
/// rather than risk signaling an unrelated, pid-recycled process.
pub const MAX_RECORD_AGE_MS: u64 = 24 * 60 * 60 * 1000;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReapSummary {
    /// Records whose Worker (and descendants) were sent a kill signal.
    pub reaped: Vec<WorkerRecord>,
    /// Records skipped because they were too old to trust.
    pub skipped_stale: usize,
    /// Records skipped because the pid was already gone.
    pub skipped_dead: usize,
}

impl ReapSummary {
    pub fn is_empty(&self) -> bool {
        self.reaped.is_empty() && self.skipped_stale == 0 && self.skipped_dead == 0
    }
}

/// Runs the reap sweep once, against whatever the previous instance left
/// behind in `state_dir`. Always deletes the persisted record file
/// afterward, regardless of outcome — the next instance starts a fresh
/// registry either way.
pub async fn reap_orphans(state_dir: &Path, clock: &dyn Clock) -> ReapSummary {
    let records = load_worker_records(state_dir).await;
    if records.is_empty() {
        return ReapSummary::default();
    }

    let now_ms = clock.epoch_ms();
    let mut summary = ReapSummary::default();

    for record in records {
        let age_ms = now_ms.saturating_sub(record.spawned_at_ms);
        if age_ms > MAX_RECORD_AGE_MS {
            summary.skipped_stale += 1;
            continue;
        }

        if !is_alive(record.pid) {
            summary.skipped_dead += 1;
            continue;
        }

        let mut targets = descendant_pids(record.pid);
        targets.push(record.pid);
        for pid in targets {
            kill_with_escalation(pid, KILL_ESCALATION_GRACE).await;
        }
        summary.reaped.push(record);
    }

    delete_worker_records(state_dir).await;

    info!(
        reaped = summary.reaped.len(),
        skipped_stale = summary.skipped_stale,
        skipped_dead = summary.skipped_dead,
        "orphan reap sweep complete"
    );

    summary
}

#[cfg(test)]
#[path = "reaper_tests.rs"]
mod tests;
