// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `POST /push/subscribe` and `POST /push/unsubscribe`.
//!
//! Out of core: no subscription registry or VAPID delivery exists here.
//! What *is* in scope is the authorization check — the caller must present
//! an `X-Push-Token` matching one minted for a live SSE connection — since
//! that is part of the same token `bridge-sse` already hands out at
//! `hello` time, not something a future deposit layer would add.

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};

use crate::error::RouterError;
use crate::state::AppState;

const PUSH_TOKEN_HEADER: &str = "x-push-token";

fn check_token(state: &AppState, headers: &HeaderMap) -> Result<(), RouterError> {
    let token = headers
        .get(PUSH_TOKEN_HEADER)
        .and_then(|value| value.to_str().ok())
        .ok_or(RouterError::Unauthorized)?;
    if state.hub.token_is_valid(token) {
        Ok(())
    } else {
        Err(RouterError::Unauthorized)
    }
}

pub async fn post_subscribe(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<StatusCode, RouterError> {
    check_token(&state, &headers)?;
    Ok(StatusCode::OK)
}

pub async fn post_unsubscribe(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<StatusCode, RouterError> {
    check_token(&state, &headers)?;
    Ok(StatusCode::OK)
}

#[cfg(test)]
#[path = "push_tests.rs"]
mod tests;
