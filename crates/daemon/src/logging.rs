// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Logging setup: `tracing` + `tracing-subscriber` (env-filter) +
//! `tracing-appender` (non-blocking writer), matching the teacher's
//! `setup_logging` shape — a rolling file appender when `LOG_FILE` is set,
//! stderr otherwise.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::Config;

/// Guard that must be held for the process lifetime to keep the
/// non-blocking writer flushing.
pub struct LogGuard(#[allow(dead_code)] tracing_appender::non_blocking::WorkerGuard);

pub fn setup(config: &Config) -> std::io::Result<LogGuard> {
    let filter = EnvFilter::try_new(&config.log_level).unwrap_or_else(|_| EnvFilter::new("info"));

    let guard = match &config.log_file {
        Some(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let dir = path.parent().unwrap_or_else(|| std::path::Path::new("."));
            let file_name = path.file_name().unwrap_or_default();
            let appender = tracing_appender::rolling::never(dir, file_name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().with_writer(writer))
                .init();
            guard
        }
        None => {
            let (writer, guard) = tracing_appender::non_blocking(std::io::stderr());
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().with_writer(writer))
                .init();
            guard
        }
    };

    Ok(LogGuard(guard))
}
