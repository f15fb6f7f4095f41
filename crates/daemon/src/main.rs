// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The bridge daemon (`bridged`): binds the HTTP + SSE surface described in
//! spec §6, owns the one `SessionRegistry` for the process's lifetime, and
//! carries the startup/shutdown recovery story (orphan reap sweep,
//! one-shot `ShutdownContext`) described in spec §4.5.
//!
//! Architecture:
//! - axum router (`crate::router`) dispatches HTTP requests against shared
//!   [`state::AppState`].
//! - Each folder's [`bridge_session::SessionHandle`] is an independent actor
//!   task; this binary only ever reaches one through the registry.
//! - `crate::relay` is the one place `bridge-session`, `bridge-sse`, and
//!   `bridge-storage` — each otherwise independent — are wired together.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod config;
mod error;
mod folder;
mod handlers;
mod logging;
mod middleware;
mod rate_limit;
mod relay;
mod router;
mod state;

use std::path::Path;
use std::sync::{Arc, Mutex};

use bridge_core::{Clock, ShutdownContext, SystemClock};
use tokio::signal::unix::{signal, SignalKind};
use tokio::sync::oneshot;
use tracing::{error, info};

use config::Config;
use state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    if let Some(arg) = std::env::args().nth(1) {
        match arg.as_str() {
            "--version" | "-V" | "-v" => {
                println!("bridged {}", env!("CARGO_PKG_VERSION"));
                return Ok(());
            }
            "--help" | "-h" | "help" => {
                print_help();
                return Ok(());
            }
            _ => {
                eprintln!("error: unexpected argument '{arg}'");
                eprintln!("Usage: bridged [--help | --version]");
                std::process::exit(1);
            }
        }
    }

    let config = match Config::load() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("failed to start bridge: {err}");
            std::process::exit(1);
        }
    };

    rotate_log_if_needed(config.log_file.as_deref());
    let _log_guard = logging::setup(&config)?;

    info!(
        port = config.port,
        scan_root = %config.scan_root.display(),
        "starting bridge"
    );

    // Reap sweep runs before the registry is otherwise touched (spec §4.5):
    // any Worker a previous instance left behind gets killed, descendants
    // included, before a fresh Session could ever be confused for it.
    let reap_summary = bridge_storage::reap_orphans(&config.state_dir, &SystemClock).await;
    if !reap_summary.is_empty() {
        info!(
            reaped = reap_summary.reaped.len(),
            skipped_stale = reap_summary.skipped_stale,
            skipped_dead = reap_summary.skipped_dead,
            "orphan reap sweep complete"
        );
    }

    // One-shot: present iff the previous shutdown was graceful. Consumed
    // (and deleted) here; absence from this point on means "crash".
    let shutdown_context = bridge_storage::take_shutdown_context(&config.state_dir).await;

    let port = config.port;
    let state = AppState::new(config, shutdown_context);
    let keepalive = state.hub.clone().spawn_keepalive();

    let app = router::build(state.clone());
    let listener = match tokio::net::TcpListener::bind(("0.0.0.0", port)).await {
        Ok(listener) => listener,
        Err(err) => {
            error!(port, error = %err, "failed to bind — port likely already in use");
            std::process::exit(1);
        }
    };

    info!(port, "bridge listening");
    println!("READY");

    let signal_name = Arc::new(Mutex::new(String::from("SIGTERM")));
    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
    spawn_signal_watcher(signal_name.clone(), shutdown_tx)?;

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<std::net::SocketAddr>(),
    )
    .with_graceful_shutdown(async move {
        let _ = shutdown_rx.await;
    })
    .await?;

    keepalive.abort();
    let signal = signal_name.lock().unwrap_or_else(|e| e.into_inner()).clone();
    graceful_shutdown(&state, &signal).await;

    info!("bridge stopped");
    Ok(())
}

/// Watches SIGTERM/SIGINT and signals graceful shutdown on whichever fires
/// first, recording which one it was so the persisted [`ShutdownContext`]
/// carries the real cause rather than a guess.
fn spawn_signal_watcher(
    signal_name: Arc<Mutex<String>>,
    shutdown_tx: oneshot::Sender<()>,
) -> std::io::Result<()> {
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;
    tokio::spawn(async move {
        let name = tokio::select! {
            _ = sigterm.recv() => "SIGTERM",
            _ = sigint.recv() => "SIGINT",
        };
        info!(signal = name, "received shutdown signal");
        *signal_name.lock().unwrap_or_else(|e| e.into_inner()) = name.to_string();
        let _ = shutdown_tx.send(());
    });
    Ok(())
}

/// Persists the [`ShutdownContext`] (which folders had a turn in flight,
/// under which signal, at what time) and tears every live Session's Worker
/// down without writing an exit marker — a graceful shutdown must still
/// resume normally on the next start, unlike an explicit `/exit`.
async fn graceful_shutdown(state: &AppState, signal: &str) {
    let sessions = state.registry.all().await;

    let mut active_turn_folders = Vec::with_capacity(sessions.len());
    for (folder, handle) in &sessions {
        if handle.turn_in_progress().await.unwrap_or(false) {
            active_turn_folders.push(folder.to_string_lossy().into_owned());
        }
    }

    let context = ShutdownContext {
        signal: signal.to_string(),
        timestamp_ms: SystemClock.epoch_ms(),
        active_turn_folders,
    };
    if let Err(err) =
        bridge_storage::write_shutdown_context(&state.config.state_dir, &context).await
    {
        error!(error = %err, "failed to persist shutdown context");
    }

    for (_, handle) in sessions {
        let _ = handle.shutdown().await;
    }

    if let Err(err) = state.records.flush_now().await {
        error!(error = %err, "failed to flush worker records at shutdown");
    }
}

fn print_help() {
    println!("bridged {}", env!("CARGO_PKG_VERSION"));
    println!("Supervisor bridge between mobile/web clients and a local Worker subprocess.");
    println!();
    println!("USAGE:");
    println!("    bridged");
    println!();
    println!("CONFIGURATION (environment variables):");
    println!("    BRIDGE_PORT           HTTP port (default 3001)");
    println!("    GRACE_MS              idle grace window in ms before an unattended Worker is reaped (default 300000)");
    println!("    SCAN_ROOT             folders are only ever resolved under this directory");
    println!("    TAILSCALE_HOSTNAME    extra CORS-allowed origin");
    println!("    LOG_LEVEL             debug|info|warn|error (default info)");
    println!("    LOG_FILE              append path (default: stderr)");
    println!();
    println!("OPTIONS:");
    println!("    -h, --help       Print help information");
    println!("    -v, --version    Print version information");
}

/// Maximum log file size before rotation (10 MB).
const MAX_LOG_SIZE: u64 = 10 * 1024 * 1024;

/// Number of rotated log files to keep (bridge.log.1, .2, .3).
const MAX_ROTATED_LOGS: u32 = 3;

/// Rotate the log file if it exceeds [`MAX_LOG_SIZE`]. No-op when logging to
/// stderr (`LOG_FILE` unset) or the file does not exist yet.
fn rotate_log_if_needed(log_path: Option<&Path>) {
    let Some(log_path) = log_path else { return };

    let size = match std::fs::metadata(log_path) {
        Ok(m) => m.len(),
        Err(_) => return,
    };
    if size < MAX_LOG_SIZE {
        return;
    }

    let log_str = log_path.display().to_string();
    for i in (1..MAX_ROTATED_LOGS).rev() {
        let from = format!("{log_str}.{i}");
        let to = format!("{log_str}.{}", i + 1);
        let _ = std::fs::rename(&from, &to);
    }
    let _ = std::fs::rename(log_path, format!("{log_str}.1"));
}

#[cfg(test)]
#[path = "main_tests.rs"]
mod tests;
