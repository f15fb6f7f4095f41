// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Spawning the Worker and wiring its stdio.

use std::collections::VecDeque;
use std::path::Path;
use std::sync::{Arc, Mutex};

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStdin, Command};
use tokio::sync::mpsc;

use crate::error::WorkerError;

/// Number of trailing stderr lines retained for diagnostics. Never broadcast
/// to clients — surfaced only in rich error deltas on Worker crash.
pub const STDERR_RING_CAPACITY: usize = 20;

/// A running Worker subprocess: the child handle, a writer for stdin, a
/// channel of raw stdout lines, and a bounded ring of recent stderr lines.
pub struct WorkerHandle {
    pid: u32,
    child: Child,
    stdin: ChildStdin,
    pub stdout_lines: mpsc::Receiver<String>,
    stderr_ring: Arc<Mutex<VecDeque<String>>>,
}

/// One of the two things that can happen to a running Worker: a stdout
/// line, or the process exiting. Combined into a single method so callers
/// needing "next line OR exit, whichever first" never have to hold two
/// overlapping mutable borrows of the same [`WorkerHandle`] across an
/// `await` — see `bridge-session`'s actor loop.
#[derive(Debug)]
pub enum WorkerIoEvent {
    Line(String),
    /// The stdout reader task ended (pipe closed) without the process wait
    /// resolving yet; the next call to [`WorkerHandle::next_event`] will
    /// simply race straight to the exit status.
    Eof,
    Exited(std::io::Result<std::process::ExitStatus>),
}

impl WorkerHandle {
    pub fn pid(&self) -> u32 {
        self.pid
    }

    /// Waits for the next stdout line or process exit, whichever comes first.
    pub async fn next_event(&mut self) -> WorkerIoEvent {
        tokio::select! {
            line = self.stdout_lines.recv() => match line {
                Some(line) => WorkerIoEvent::Line(line),
                None => WorkerIoEvent::Eof,
            },
            status = self.child.wait() => WorkerIoEvent::Exited(status),
        }
    }

    /// Writes one JSON line to the Worker's stdin, terminated with `\n` and
    /// flushed immediately — the Worker reads stdin line-by-line.
    pub async fn write_line(&mut self, line: &str) -> Result<(), WorkerError> {
        self.stdin
            .write_all(line.as_bytes())
            .await
            .map_err(WorkerError::StdinWrite)?;
        self.stdin
            .write_all(b"\n")
            .await
            .map_err(WorkerError::StdinWrite)?;
        self.stdin.flush().await.map_err(WorkerError::StdinWrite)
    }

    /// Snapshot of the last [`STDERR_RING_CAPACITY`] stderr lines, oldest first.
    pub fn stderr_tail(&self) -> Vec<String> {
        let ring = self.stderr_ring.lock().unwrap_or_else(|e| e.into_inner());
        ring.iter().cloned().collect()
    }

    /// Non-blocking check for exit, per [`tokio::process::Child::try_wait`].
    pub fn try_wait(&mut self) -> std::io::Result<Option<std::process::ExitStatus>> {
        self.child.try_wait()
    }

    pub async fn wait(&mut self) -> std::io::Result<std::process::ExitStatus> {
        self.child.wait().await
    }
}

/// Spawns the Worker with piped stdio.
///
/// `env` replaces the process environment wholesale (callers compute it from
/// the bridge's own environment, minus [`bridge_core::STRIPPED_ENV_VARS`]) so
/// spawning is deterministic and does not depend on ambient process state.
pub async fn spawn(
    program: &str,
    argv: &[String],
    cwd: &Path,
    env: Vec<(String, String)>,
) -> Result<WorkerHandle, WorkerError> {
    let mut cmd = Command::new(program);
    cmd.args(argv)
        .current_dir(cwd)
        .env_clear()
        .envs(env)
        .stdin(std::process::Stdio::piped())
        .stdout(std::process::Stdio::piped())
        .stderr(std::process::Stdio::piped())
        .kill_on_drop(true);

    let mut child = cmd.spawn().map_err(WorkerError::Spawn)?;
    let pid = child.id().ok_or(WorkerError::MissingStdio)?;

    let stdin = child.stdin.take().ok_or(WorkerError::MissingStdio)?;
    let stdout = child.stdout.take().ok_or(WorkerError::MissingStdio)?;
    let stderr = child.stderr.take().ok_or(WorkerError::MissingStdio)?;

    let (stdout_tx, stdout_rx) = mpsc::channel(256);
    tokio::spawn(async move {
        let mut lines = BufReader::new(stdout).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            if stdout_tx.send(line).await.is_err() {
                break;
            }
        }
    });

    let stderr_ring = Arc::new(Mutex::new(VecDeque::with_capacity(STDERR_RING_CAPACITY)));
    let ring_for_reader = stderr_ring.clone();
    tokio::spawn(async move {
        let mut lines = BufReader::new(stderr).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            let mut ring = ring_for_reader.lock().unwrap_or_else(|e| e.into_inner());
            if ring.len() == STDERR_RING_CAPACITY {
                ring.pop_front();
            }
            ring.push_back(line);
        }
    });

    Ok(WorkerHandle {
        pid,
        child,
        stdin,
        stdout_lines: stdout_rx,
        stderr_ring,
    })
}

#[cfg(test)]
#[path = "process_tests.rs"]
mod tests;
