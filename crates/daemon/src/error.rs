// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Router's error taxonomy (spec §7), converted to an HTTP response at
//! the edge — domain errors never escape a handler as a panic.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RouterError {
    #[error("{0}")]
    BadRequest(String),
    #[error("folder must be a descendant of the scan root")]
    PathOutsideRoot,
    #[error("request body too large")]
    BodyTooLarge,
    #[error("no session for this folder")]
    NotFound,
    #[error("invalid or missing push token")]
    Unauthorized,
    #[error("rate limit exceeded")]
    RateLimited,
    #[error("session actor error: {0}")]
    Session(#[from] bridge_session::SessionError),
}

impl IntoResponse for RouterError {
    fn into_response(self) -> Response {
        let status = match &self {
            RouterError::BadRequest(_) => StatusCode::BAD_REQUEST,
            RouterError::PathOutsideRoot => StatusCode::BAD_REQUEST,
            RouterError::BodyTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            RouterError::NotFound => StatusCode::NOT_FOUND,
            RouterError::Unauthorized => StatusCode::UNAUTHORIZED,
            RouterError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            RouterError::Session(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = Json(serde_json::json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}
