// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Tunables for a Session actor's timer hierarchy and Worker spawn.

use std::path::PathBuf;
use std::time::Duration;

/// Configuration shared by every Session actor, threaded down from
/// `bridge-daemon`'s `Config::load()`.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Program to exec for the Worker (e.g. `claude`).
    pub worker_program: String,
    /// Base directory the Worker keeps its per-project journals under
    /// (`~/.claude` unless `CLAUDE_CONFIG_DIR` is set).
    pub claude_base: PathBuf,
    /// The bridge's own state directory, for exit markers and (via
    /// `bridge-storage`) active-Worker records and the shutdown context.
    pub state_dir: PathBuf,
    /// Deadline for draining `pending_deltas` once a delta arrives.
    pub flush_interval: Duration,
    /// Deadline for the Worker's first `system/init` event after spawn.
    pub init_timeout: Duration,
    /// Idle window, configurable via `GRACE_MS`, before an unattended Worker
    /// is reaped.
    pub grace_ms: Duration,
    /// Grace period between a polite kill signal and a hard kill.
    pub kill_escalation_grace: Duration,
    /// Whether to write the experimental "outrider" nudge to stdin on the
    /// first queued prompt. Off by default — the upstream Worker may remove
    /// support for it; the interface is preserved regardless.
    pub outrider_nudge_enabled: bool,
    /// Path to the Worker's MCP server config file, passed via
    /// `--mcp-config`. `None` omits the flag entirely.
    pub mcp_config: Option<PathBuf>,
}

/// Minimum time since the last prompt before the grace timer is allowed to
/// arm at all, even with zero subscribers — discriminates "just finished a
/// turn, client will probably reattach" from "genuinely idle".
pub const GRACE_ARM_SUPPRESSION: Duration = Duration::from_secs(10 * 60);

/// Deadline after which a running turn with no stream output is treated as
/// having produced no content (slash-command-only turns).
pub const INIT_TIMEOUT_DEFAULT: Duration = Duration::from_secs(30);

pub const FLUSH_INTERVAL_DEFAULT: Duration = Duration::from_millis(250);

pub const GRACE_MS_DEFAULT: Duration = Duration::from_secs(300);

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            worker_program: "claude".to_string(),
            claude_base: crate::journal_path::default_claude_base(),
            state_dir: std::env::temp_dir().join("bridge"),
            flush_interval: FLUSH_INTERVAL_DEFAULT,
            init_timeout: INIT_TIMEOUT_DEFAULT,
            grace_ms: GRACE_MS_DEFAULT,
            kill_escalation_grace: bridge_worker::KILL_ESCALATION_GRACE,
            outrider_nudge_enabled: false,
            mcp_config: None,
        }
    }
}
