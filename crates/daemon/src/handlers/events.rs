// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `GET /events?clientId=<id>` — the SSE lobby connection.
//!
//! First frame is always `hello`; a `folders` frame follows asynchronously
//! once the scan root has been walked, matching the connect sequence in
//! spec §4.4. A `Last-Event-ID` header on the request means this is a
//! reconnect, echoed back in `hello.reconnect` so the client knows whether
//! it needs to re-fetch anything it might have missed.

use std::convert::Infallible;
use std::time::Duration;

use axum::extract::{Query, State};
use axum::http::header::LAST_EVENT_ID;
use axum::http::HeaderMap;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::IntoResponse;
use bridge_core::ClientId;
use serde::Deserialize;
use tokio_stream::wrappers::ReceiverStream;
use tokio_stream::{Stream, StreamExt};

use crate::error::RouterError;
use crate::handlers::folders;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct EventsQuery {
    #[serde(rename = "clientId")]
    client_id: Option<String>,
}

/// Drops the SSE subscriber registration when the connection's stream is
/// dropped — covers both a clean client disconnect and the server shutting
/// the response down.
struct DisconnectGuard {
    hub: bridge_sse::SseHub,
    client_id: ClientId,
}

impl Drop for DisconnectGuard {
    fn drop(&mut self) {
        let _ = self.hub.disconnect(&self.client_id);
    }
}

pub async fn get_events(
    State(state): State<AppState>,
    Query(query): Query<EventsQuery>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, RouterError> {
    let raw_id = query
        .client_id
        .ok_or_else(|| RouterError::BadRequest("clientId query parameter is required".to_string()))?;
    let client_id = ClientId::new(raw_id);
    let reconnect = headers.contains_key(LAST_EVENT_ID);

    let connection = state.hub.connect(client_id.clone(), reconnect, None);

    spawn_folders_push(state.clone(), connection.client_id.clone());

    let guard = DisconnectGuard {
        hub: state.hub.clone(),
        client_id: connection.client_id.clone(),
    };
    let hub = state.hub.clone();
    let cid = connection.client_id.clone();

    let stream = ReceiverStream::new(connection.rx).map(move |frame| {
        let _guard = &guard;
        let seq = bridge_sse::next_seq(&hub, &cid).unwrap_or(0);
        Ok::<Event, Infallible>(frame.into_event(seq))
    });

    let boxed: BoxedEventStream = Box::pin(stream);
    Ok(Sse::new(boxed).keep_alive(KeepAlive::new().interval(Duration::from_secs(30))))
}

type BoxedEventStream = std::pin::Pin<Box<dyn Stream<Item = Result<Event, Infallible>> + Send>>;

fn spawn_folders_push(state: AppState, client_id: ClientId) {
    tokio::spawn(async move {
        let folders = folders::scan(&state).await;
        state.hub.send_folders(&client_id, &folders);
    });
}

#[cfg(test)]
#[path = "events_tests.rs"]
mod tests;
