// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon configuration, loaded from environment variables.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not determine a state directory (set BRIDGE_STATE_DIR or HOME)")]
    NoStateDir,
}

/// The bridge's runtime configuration, resolved once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// `BRIDGE_PORT`, default 3001.
    pub port: u16,
    /// `GRACE_MS`, default 300_000 — idle window before an unattended Worker
    /// is reaped.
    pub grace_ms: Duration,
    /// `SCAN_ROOT` — folders are only ever resolved as descendants of this
    /// directory. Defaults to the daemon's own working directory when unset.
    pub scan_root: PathBuf,
    /// `TAILSCALE_HOSTNAME` — an additional origin allowed through CORS,
    /// alongside localhost, for a Tailscale-meshed client.
    pub tailscale_hostname: Option<String>,
    /// `LOG_LEVEL` (`debug|info|warn|error`), default `info`.
    pub log_level: String,
    /// `LOG_FILE` — append path; stderr is used when unset.
    pub log_file: Option<PathBuf>,
    /// Root directory for `bridge-storage`'s persisted files and
    /// `bridge-session`'s exit markers.
    pub state_dir: PathBuf,
    /// Program exec'd for the Worker. Not part of the documented CLI
    /// surface; overridable for development against a non-default binary.
    pub worker_program: String,
    /// Whether to enable the experimental "outrider" nudge on queued prompts.
    pub outrider_nudge_enabled: bool,
    /// `BRIDGE_MCP_CONFIG` — path to the Worker's MCP server config file.
    /// Unset omits `--mcp-config` from the Worker's argv entirely.
    pub mcp_config: Option<PathBuf>,
}

const DEFAULT_PORT: u16 = 3001;
const DEFAULT_GRACE_MS: u64 = 300_000;

impl Config {
    pub fn load() -> Result<Self, ConfigError> {
        let state_dir = state_dir()?;

        Ok(Self {
            port: env_u16("BRIDGE_PORT").unwrap_or(DEFAULT_PORT),
            grace_ms: Duration::from_millis(env_u64("GRACE_MS").unwrap_or(DEFAULT_GRACE_MS)),
            scan_root: std::env::var("SCAN_ROOT")
                .map(PathBuf::from)
                .or_else(|_| std::env::current_dir())
                .unwrap_or_else(|_| PathBuf::from(".")),
            tailscale_hostname: std::env::var("TAILSCALE_HOSTNAME").ok(),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            log_file: std::env::var("LOG_FILE").ok().map(PathBuf::from),
            state_dir,
            worker_program: std::env::var("BRIDGE_WORKER_PROGRAM")
                .unwrap_or_else(|_| "claude".to_string()),
            outrider_nudge_enabled: env_bool("BRIDGE_OUTRIDER_NUDGE").unwrap_or(false),
            mcp_config: std::env::var("BRIDGE_MCP_CONFIG").ok().map(PathBuf::from),
        })
    }
}

/// Resolves the state directory: `BRIDGE_STATE_DIR` > `XDG_STATE_HOME/bridge`
/// > `~/.local/state/bridge`.
fn state_dir() -> Result<PathBuf, ConfigError> {
    if let Ok(dir) = std::env::var("BRIDGE_STATE_DIR") {
        return Ok(PathBuf::from(dir));
    }
    if let Ok(xdg) = std::env::var("XDG_STATE_HOME") {
        return Ok(PathBuf::from(xdg).join("bridge"));
    }
    let home = std::env::var("HOME").map_err(|_| ConfigError::NoStateDir)?;
    Ok(PathBuf::from(home).join(".local/state/bridge"))
}

fn env_u16(key: &str) -> Option<u16> {
    std::env::var(key).ok().and_then(|s| s.parse().ok())
}

fn env_u64(key: &str) -> Option<u64> {
    std::env::var(key).ok().and_then(|s| s.parse().ok())
}

fn env_bool(key: &str) -> Option<bool> {
    std::env::var(key).ok().and_then(|s| match s.as_str() {
        "1" | "true" | "yes" => Some(true),
        "0" | "false" | "no" => Some(false),
        _ => None,
    })
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
