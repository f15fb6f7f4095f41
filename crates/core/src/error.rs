// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for PureLogic.

use thiserror::Error;

/// Errors surfaced by the stateless helper functions in this crate.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("failed to read journal file: {0}")]
    JournalRead(#[from] std::io::Error),
    #[error("malformed tool input JSON on block {index}: {source}")]
    ToolInputJson {
        index: usize,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid folder path: {0}")]
    InvalidPath(String),
}
