// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! A small fixed-window rate limiter for `/client-error`.

use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::Mutex;
use std::time::{Duration, Instant};

const WINDOW: Duration = Duration::from_secs(60);
const LIMIT: u32 = 10;

struct Window {
    started_at: Instant,
    count: u32,
}

#[derive(Default)]
pub struct RateLimiter {
    windows: Mutex<HashMap<IpAddr, Window>>,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self::default()
    }

    /// True iff `addr` is still under the limit for its current window;
    /// increments the count as a side effect either way, so a client that
    /// keeps hammering past the limit does not get its window silently
    /// reset by the check itself.
    pub fn check(&self, addr: IpAddr) -> bool {
        let mut windows = self.windows.lock().unwrap_or_else(|e| e.into_inner());
        let now = Instant::now();
        let window = windows.entry(addr).or_insert_with(|| Window {
            started_at: now,
            count: 0,
        });

        if now.duration_since(window.started_at) >= WINDOW {
            window.started_at = now;
            window.count = 0;
        }

        window.count += 1;
        window.count <= LIMIT
    }
}

#[cfg(test)]
#[path = "rate_limit_tests.rs"]
mod tests;
