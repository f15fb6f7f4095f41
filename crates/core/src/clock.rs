// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Clock abstraction so timer and staleness comparisons are deterministic in tests.

use std::sync::atomic::{AtomicU64, Ordering};

/// Current time as milliseconds since the Unix epoch.
pub trait Clock: Send + Sync {
    fn epoch_ms(&self) -> u64;
}

/// Real wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn epoch_ms(&self) -> u64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0)
    }
}

/// Deterministic clock for tests — starts at an arbitrary fixed instant and
/// only advances when told to.
pub struct FakeClock {
    now_ms: AtomicU64,
}

impl FakeClock {
    pub fn new() -> Self {
        Self {
            now_ms: AtomicU64::new(1_700_000_000_000),
        }
    }

    pub fn at(epoch_ms: u64) -> Self {
        Self {
            now_ms: AtomicU64::new(epoch_ms),
        }
    }

    pub fn advance_ms(&self, delta: u64) {
        self.now_ms.fetch_add(delta, Ordering::SeqCst);
    }

    pub fn set_ms(&self, epoch_ms: u64) {
        self.now_ms.store(epoch_ms, Ordering::SeqCst);
    }
}

impl Default for FakeClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for FakeClock {
    fn epoch_ms(&self) -> u64 {
        self.now_ms.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
#[path = "clock_tests.rs"]
mod tests;
