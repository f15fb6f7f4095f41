// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `POST /upload[?stage=true]` and `POST /upload/:folder` — the deposit
//! layer. Out of core: the endpoints exist so a client gets a clear,
//! structured rejection rather than a 404 it has to special-case.

use axum::extract::Path;
use axum::http::StatusCode;
use axum::Json;

use crate::error::RouterError;

#[derive(serde::Serialize)]
struct NotImplemented {
    error: &'static str,
}

const MESSAGE: &str = "upload is not implemented by this bridge";

pub async fn post_upload() -> Result<(StatusCode, Json<NotImplemented>), RouterError> {
    Ok((
        StatusCode::NOT_IMPLEMENTED,
        Json(NotImplemented { error: MESSAGE }),
    ))
}

pub async fn post_upload_folder(
    Path(_folder): Path<String>,
) -> Result<(StatusCode, Json<NotImplemented>), RouterError> {
    Ok((
        StatusCode::NOT_IMPLEMENTED,
        Json(NotImplemented { error: MESSAGE }),
    ))
}
