// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Builds the axum `Router`: every route in spec §6's HTTP table, CORS,
//! body-size limits, and the request-tracing middleware.

use axum::extract::DefaultBodyLimit;
use axum::http::{HeaderValue, Method};
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;

use crate::handlers;
use crate::middleware::trace_and_log;
use crate::state::AppState;

const JSON_BODY_LIMIT: usize = 1024 * 1024;
const UPLOAD_BODY_LIMIT: usize = 50 * 1024 * 1024;

pub fn build(state: AppState) -> Router {
    let get_routes = Router::new()
        .route("/events", get(handlers::events::get_events))
        .route("/folders", get(handlers::folders::get_folders))
        .route("/status", get(handlers::status::get_status));

    let json_routes = Router::new()
        .route("/session/{folder}", post(handlers::session::post_session))
        .route("/prompt/{folder}", post(handlers::prompt::post_prompt))
        .route("/abort/{folder}", post(handlers::abort::post_abort))
        .route("/exit/{folder}", post(handlers::exit::post_exit))
        .route("/client-error", post(handlers::client_error::post_client_error))
        .route("/push/subscribe", post(handlers::push::post_subscribe))
        .route("/push/unsubscribe", post(handlers::push::post_unsubscribe))
        .layer(DefaultBodyLimit::max(JSON_BODY_LIMIT));

    let upload_routes = Router::new()
        .route("/upload", post(handlers::upload::post_upload))
        .route("/upload/{folder}", post(handlers::upload::post_upload_folder))
        .layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT));

    Router::new()
        .merge(get_routes)
        .merge(json_routes)
        .merge(upload_routes)
        .layer(axum::middleware::from_fn_with_state(state.clone(), trace_and_log))
        .layer(build_cors(&state))
        .with_state(state)
}

/// Localhost is always allowed (the mobile client's own dev proxy runs
/// there); a configured Tailscale hostname is added on top so a phone on
/// the tailnet can reach the bridge directly without relaxing CORS further.
fn build_cors(state: &AppState) -> CorsLayer {
    let mut origins = vec![
        HeaderValue::from_static("http://localhost"),
        HeaderValue::from_static("http://localhost:3000"),
        HeaderValue::from_static("http://127.0.0.1"),
    ];
    if let Some(host) = &state.config.tailscale_hostname {
        if let Ok(value) = HeaderValue::from_str(&format!("http://{host}")) {
            origins.push(value);
        }
        if let Ok(value) = HeaderValue::from_str(&format!("https://{host}")) {
            origins.push(value);
        }
    }

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(tower_http::cors::Any)
}
