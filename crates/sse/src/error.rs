// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SseError {
    #[error("no subscriber with that client id")]
    UnknownClient,
}
