// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! A small debounce helper for whole-file persistence writes.
//!
//! This is the teacher's `Wal`/`Checkpointer` "buffer writes, flush on a
//! timer" idea, simplified: this crate has no append-only log and no
//! partial-state checkpoints, just a handful of small JSON files rewritten
//! wholesale whenever their contents change. One [`Debouncer`] coalesces
//! any number of `mark_dirty` calls inside one delay window into a single
//! write.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Coalesces repeated "something changed" signals into at most one write
/// per `delay` window.
#[derive(Clone)]
pub struct Debouncer {
    delay: Duration,
    pending: Arc<AtomicBool>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Schedules `write` to run after the debounce delay, unless a write is
    /// already pending — in which case this call is a no-op, and the
    /// already-scheduled write will pick up whatever state exists by the
    /// time it actually runs.
    pub fn schedule<F, Fut>(&self, write: F)
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        if self.pending.swap(true, Ordering::SeqCst) {
            return;
        }
        let pending = self.pending.clone();
        let delay = self.delay;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            pending.store(false, Ordering::SeqCst);
            write().await;
        });
    }
}
