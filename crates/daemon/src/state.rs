// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared state handed to every axum handler via `axum::extract::State`.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Instant;

use bridge_core::{Clock, ShutdownContext, UuidIdGen};
use bridge_session::{NoopPushNotifier, PushNotifier, SessionConfig, SessionRegistry};
use bridge_sse::SseHub;
use bridge_storage::WorkerRecordStore;

use crate::config::Config;
use crate::rate_limit::RateLimiter;

/// One logged HTTP request, for `/status`'s recent-events buffer. SSE and
/// status requests themselves are excluded (spec §4.6: "noisy").
#[derive(Debug, Clone, serde::Serialize)]
pub struct RecentEvent {
    pub ts_ms: u64,
    pub method: String,
    pub path: String,
    pub status: u16,
}

const RECENT_EVENTS_CAPACITY: usize = 100;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub registry: SessionRegistry,
    pub hub: SseHub,
    pub records: WorkerRecordStore,
    pub push: Arc<dyn PushNotifier>,
    pub id_gen: Arc<UuidIdGen>,
    pub start_time: Instant,
    /// Loaded exactly once at startup, per spec §4.5's one-shot contract;
    /// `None` means the previous shutdown was not graceful (or this is the
    /// first run).
    pub shutdown_context: Arc<Option<ShutdownContext>>,
    pub rate_limiter: Arc<RateLimiter>,
    recent_events: Arc<Mutex<VecDeque<RecentEvent>>>,
}

impl AppState {
    pub fn new(config: Config, shutdown_context: Option<ShutdownContext>) -> Self {
        let state_dir = config.state_dir.clone();
        Self {
            config: Arc::new(config),
            registry: SessionRegistry::new(),
            hub: SseHub::new(),
            records: WorkerRecordStore::new(state_dir),
            push: Arc::new(NoopPushNotifier),
            id_gen: Arc::new(UuidIdGen),
            start_time: Instant::now(),
            shutdown_context: Arc::new(shutdown_context),
            rate_limiter: Arc::new(RateLimiter::new()),
            recent_events: Arc::new(Mutex::new(VecDeque::with_capacity(RECENT_EVENTS_CAPACITY))),
        }
    }

    /// Builds the `SessionConfig` passed to every newly-spawned `Session`.
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            worker_program: self.config.worker_program.clone(),
            claude_base: bridge_session::default_claude_base(),
            state_dir: self.config.state_dir.clone(),
            grace_ms: self.config.grace_ms,
            outrider_nudge_enabled: self.config.outrider_nudge_enabled,
            mcp_config: self.config.mcp_config.clone(),
            ..SessionConfig::default()
        }
    }

    pub fn record_event(&self, method: &str, path: &str, status: u16) {
        let event = RecentEvent {
            ts_ms: bridge_core::SystemClock.epoch_ms(),
            method: method.to_string(),
            path: path.to_string(),
            status,
        };
        let mut events = self.recent_events.lock().unwrap_or_else(|e| e.into_inner());
        if events.len() == RECENT_EVENTS_CAPACITY {
            events.pop_front();
        }
        events.push_back(event);
    }

    pub fn recent_events(&self) -> Vec<RecentEvent> {
        self.recent_events
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .cloned()
            .collect()
    }
}
