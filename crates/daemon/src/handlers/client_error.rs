// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `POST /client-error` — a client-side crash/error report, rate-limited
//! per source address so a misbehaving client cannot flood the log.

use std::net::SocketAddr;

use axum::extract::{ConnectInfo, State};
use axum::http::StatusCode;
use axum::Json;
use serde_json::Value;
use tracing::warn;

use crate::error::RouterError;
use crate::state::AppState;

pub async fn post_client_error(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    Json(report): Json<Value>,
) -> Result<StatusCode, RouterError> {
    if !state.rate_limiter.check(addr.ip()) {
        return Err(RouterError::RateLimited);
    }
    warn!(client = %addr, report = %report, "client-reported error");
    Ok(StatusCode::ACCEPTED)
}

#[cfg(test)]
#[path = "client_error_tests.rs"]
mod tests;
