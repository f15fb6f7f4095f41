// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Kill-with-escalation and process-tree inspection.
//!
//! A polite termination signal is sent first; an auxiliary, detached timer
//! escalates to a hard kill only if the process is still alive once the
//! grace period elapses. The auxiliary timer must never block shutdown —
//! it is a plain detached `tokio::spawn`, not awaited by the caller.

use std::collections::HashMap;
use std::time::Duration;

use nix::sys::signal::{self, Signal};
use nix::unistd::Pid;

/// Default grace period between the polite signal and the hard kill.
pub const KILL_ESCALATION_GRACE: Duration = Duration::from_secs(3);

/// Sends `SIGTERM`, then escalates to `SIGKILL` after `grace` if the process
/// is still alive. Returns immediately; escalation runs on a detached task.
pub async fn kill_with_escalation(pid: u32, grace: Duration) {
    let target = Pid::from_raw(pid as i32);
    let _ = signal::kill(target, Signal::SIGTERM);

    tokio::spawn(async move {
        tokio::time::sleep(grace).await;
        if is_alive(pid) {
            let _ = signal::kill(target, Signal::SIGKILL);
        }
    });
}

/// Signal-0 liveness probe: true iff a process with this pid exists and is
/// signalable by us.
pub fn is_alive(pid: u32) -> bool {
    signal::kill(Pid::from_raw(pid as i32), None).is_ok()
}

/// Enumerates every descendant of `root_pid` by walking `/proc`, in no
/// particular order.
///
/// Process trees detach under the "kill the cgroup leader but not children"
/// mode some service managers use; reaping only the recorded PID and not its
/// descendants leaves zombies holding fds/ttys open. Linux-only (`/proc`);
/// returns empty on other platforms or on any read error.
pub fn descendant_pids(root_pid: u32) -> Vec<u32> {
    let mut children_of: HashMap<u32, Vec<u32>> = HashMap::new();

    let Ok(entries) = std::fs::read_dir("/proc") else {
        return Vec::new();
    };

    for entry in entries.flatten() {
        let Ok(pid) = entry.file_name().to_string_lossy().parse::<u32>() else {
            continue;
        };
        let Ok(stat) = std::fs::read_to_string(entry.path().join("stat")) else {
            continue;
        };
        if let Some(ppid) = parse_ppid(&stat) {
            children_of.entry(ppid).or_default().push(pid);
        }
    }

    let mut result = Vec::new();
    let mut queue = vec![root_pid];
    while let Some(pid) = queue.pop() {
        if let Some(children) = children_of.get(&pid) {
            for &child in children {
                result.push(child);
                queue.push(child);
            }
        }
    }
    result
}

/// Extracts the parent pid from a `/proc/<pid>/stat` line. The `comm` field
/// (2nd, parenthesized) may itself contain spaces or parens, so the split is
/// anchored on the *last* `)` rather than whitespace.
fn parse_ppid(stat: &str) -> Option<u32> {
    let after_comm = stat.rsplit_once(')')?.1;
    after_comm.split_whitespace().nth(1)?.parse().ok()
}

#[cfg(test)]
#[path = "signal_tests.rs"]
mod tests;
