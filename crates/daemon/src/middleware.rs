// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Request-scoped identifier propagation and access logging.
//!
//! One generated id per request, carried as a `tracing::Span` field rather
//! than through any ambient/thread-local state — every log line emitted
//! while handling a request, however deep in its async call graph, picks
//! it up automatically from the span context.

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;
use tracing::Instrument;

use crate::state::AppState;

/// Endpoints polled frequently enough that per-request logging is noise
/// rather than signal.
const NOISY_PATH_PREFIXES: &[&str] = &["/events", "/status"];

pub async fn trace_and_log(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let request_id = uuid::Uuid::new_v4();
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let span = tracing::info_span!("http_request", %request_id, %method, %path);

    let started = std::time::Instant::now();
    let response = next.run(req).instrument(span.clone()).await;
    let elapsed_ms = started.elapsed().as_millis();
    let status = response.status().as_u16();

    if !NOISY_PATH_PREFIXES.iter().any(|prefix| path.starts_with(prefix)) {
        let _enter = span.enter();
        tracing::info!(status, elapsed_ms, "request completed");
        state.record_event(method.as_str(), &path, status);
    }

    response
}
