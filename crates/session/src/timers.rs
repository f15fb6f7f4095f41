// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The three independent per-Session timers: flush, init, grace.
//!
//! Never more than one instance of each timer is alive at a time. Each is a
//! thin wrapper around a re-armable [`tokio::time::Sleep`] so the actor's
//! `tokio::select!` loop can poll all three (plus the command mailbox and
//! the Worker's stdout) without ever reconstructing a timer that has
//! already started counting down.

use std::pin::Pin;
use std::time::Duration;

use tokio::time::Sleep;

/// A timer that is either disarmed (never fires) or counting down to a
/// fixed deadline. Re-arming replaces the deadline outright — there is no
/// notion of "extend" — matching the spec's "cancel-then-arm is safe" rule.
#[derive(Default)]
pub struct ArmableTimer {
    sleep: Option<Pin<Box<Sleep>>>,
}

impl ArmableTimer {
    pub fn new() -> Self {
        Self { sleep: None }
    }

    pub fn arm_after(&mut self, duration: Duration) {
        self.sleep = Some(Box::pin(tokio::time::sleep(duration)));
    }

    pub fn cancel(&mut self) {
        self.sleep = None;
    }

    pub fn is_armed(&self) -> bool {
        self.sleep.is_some()
    }

    /// Resolves when the armed deadline elapses; never resolves while
    /// disarmed. Idempotent to call repeatedly from a `select!` loop — the
    /// underlying `Sleep`, once armed, keeps its original deadline across
    /// calls until explicitly re-armed or cancelled.
    pub async fn tick(&mut self) {
        match self.sleep.as_mut() {
            Some(sleep) => sleep.as_mut().await,
            None => std::future::pending().await,
        }
    }
}
