// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `GET /status` — operator diagnostics. Never polled by the mobile client;
//! exists for a human checking in on the bridge over Tailscale.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::state::{AppState, RecentEvent};

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub uptime_secs: u64,
    pub session_count: usize,
    pub vm_rss_kb: Option<u64>,
    pub recent_events: Vec<RecentEvent>,
}

pub async fn get_status(State(state): State<AppState>) -> Json<StatusResponse> {
    Json(StatusResponse {
        uptime_secs: state.start_time.elapsed().as_secs(),
        session_count: state.registry.len().await,
        vm_rss_kb: read_vm_rss_kb(),
        recent_events: state.recent_events(),
    })
}

/// Best-effort resident set size from `/proc/self/status`. `None` off Linux
/// or if the file cannot be read — this is a diagnostic aid, not a
/// guaranteed metric.
fn read_vm_rss_kb() -> Option<u64> {
    let body = std::fs::read_to_string("/proc/self/status").ok()?;
    body.lines().find_map(|line| {
        let rest = line.strip_prefix("VmRSS:")?;
        rest.trim().split_whitespace().next()?.parse().ok()
    })
}

#[cfg(test)]
#[path = "status_tests.rs"]
mod tests;
