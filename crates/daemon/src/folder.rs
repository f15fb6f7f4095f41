// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Resolving a `:folder` path parameter against the configured scan root.
//!
//! A folder is sent as one percent-encoded path segment — axum decodes it
//! back to a plain string before this module ever sees it, so an absolute
//! path's embedded `/` survives the single-segment route match.

use std::path::{Path, PathBuf};

use crate::error::RouterError;
use crate::state::AppState;

/// Resolves `raw` to an absolute folder path, rejecting anything that is
/// not a strict descendant of the configured scan root.
pub fn resolve_folder(state: &AppState, raw: &str) -> Result<PathBuf, RouterError> {
    let root = &state.config.scan_root;
    let candidate = if Path::new(raw).is_absolute() {
        PathBuf::from(raw)
    } else {
        root.join(raw)
    };

    let root_str = root.to_string_lossy();
    let candidate_str = candidate.to_string_lossy();
    if !bridge_core::validate_folder_path(&candidate_str, &root_str) {
        return Err(RouterError::PathOutsideRoot);
    }

    Ok(candidate)
}

#[cfg(test)]
#[path = "folder_tests.rs"]
mod tests;
