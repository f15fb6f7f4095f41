// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The SSE client registry and fan-out engine.
//!
//! Each subscriber is a bounded channel the hub writes [`OutboundFrame`]s
//! into; a per-connection task (owned by the axum handler, see
//! `bridge-daemon::handlers::events`) drains it into an actual SSE byte
//! stream. Keeping the channel bounded is what makes back-pressure-aware
//! selective skip possible: a full channel for a *delta* frame means the
//! reader is behind, so that flush is simply dropped rather than blocking
//! the whole hub or growing memory without limit.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use bridge_core::ClientId;
use bridge_state::{Delta, Snapshot};
use tokio::sync::mpsc;
use tokio::time::interval;
use tracing::debug;

use crate::error::SseError;
use crate::frame::{FolderInfo, OutboundFrame};
use crate::token::mint_push_token;

/// Per-subscriber outbound channel capacity. A subscriber this far behind
/// on delta flushes is considered saturated; the next flush is skipped
/// rather than buffered further.
const SUBSCRIBER_CHANNEL_CAPACITY: usize = 64;

/// Keep-alive cadence: the hub emits a `ping` frame to every subscriber on
/// this interval, independent of any traffic.
pub const PING_INTERVAL: Duration = Duration::from_secs(30);

struct Subscriber {
    tx: mpsc::Sender<OutboundFrame>,
    folder: Option<PathBuf>,
    seq: u64,
    push_token: String,
}

#[derive(Default)]
struct HubState {
    subscribers: HashMap<ClientId, Subscriber>,
}

/// The shared SSE client registry. Cheap to clone; all clones share one
/// subscriber table.
#[derive(Clone, Default)]
pub struct SseHub {
    state: Arc<std::sync::Mutex<HubState>>,
}

/// The receiving half of a freshly-registered subscriber, handed to the
/// axum handler to drive the actual HTTP response stream.
pub struct Connection {
    pub client_id: ClientId,
    pub push_token: String,
    pub rx: mpsc::Receiver<OutboundFrame>,
}

impl SseHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new subscriber in the "lobby" (unbound to any folder)
    /// and immediately queues its `hello` frame.
    ///
    /// `reconnect` is true iff the request carried a standard SSE
    /// `Last-Event-ID` header — that's an HTTP-layer fact `bridge-daemon`
    /// observes and passes in, not something this crate can see itself.
    pub fn connect(
        &self,
        client_id: ClientId,
        reconnect: bool,
        vapid_public_key: Option<&str>,
    ) -> Connection {
        let (tx, rx) = mpsc::channel(SUBSCRIBER_CHANNEL_CAPACITY);
        let push_token = mint_push_token();

        let hello = OutboundFrame::hello(client_id.as_str(), reconnect, &push_token, vapid_public_key);
        let _ = tx.try_send(hello);

        let mut state = self.lock();
        state.subscribers.insert(
            client_id.clone(),
            Subscriber {
                tx: tx.clone(),
                folder: None,
                seq: 1,
                push_token: push_token.clone(),
            },
        );

        Connection {
            client_id,
            push_token,
            rx,
        }
    }

    /// Pushes the lobby `folders` snapshot to one subscriber, matching the
    /// "asynchronously emit a folders snapshot" step of the connect
    /// sequence — sent after `hello`, not blocking the initial response.
    pub fn send_folders(&self, client_id: &ClientId, folders: &[FolderInfo]) {
        self.unicast(client_id, OutboundFrame::folders(folders));
    }

    /// Binds a subscriber to a folder (leaving the lobby), or clears its
    /// binding back to the lobby when `folder` is `None`.
    pub fn bind(&self, client_id: &ClientId, folder: Option<&Path>) {
        if let Some(sub) = self.lock().subscribers.get_mut(client_id) {
            sub.folder = folder.map(Path::to_path_buf);
        }
    }

    pub fn disconnect(&self, client_id: &ClientId) -> Result<(), SseError> {
        self.lock()
            .subscribers
            .remove(client_id)
            .map(|_| ())
            .ok_or(SseError::UnknownClient)
    }

    pub fn push_token(&self, client_id: &ClientId) -> Option<String> {
        self.lock()
            .subscribers
            .get(client_id)
            .map(|s| s.push_token.clone())
    }

    /// True iff any token currently minted matches `token` — used to
    /// authorize `/push/subscribe` and `/push/unsubscribe`.
    pub fn token_is_valid(&self, token: &str) -> bool {
        self.lock()
            .subscribers
            .values()
            .any(|s| s.push_token == token)
    }

    /// Count of subscribers currently bound to `folder` — what
    /// `bridge-session`'s grace timer reads to decide whether to arm.
    pub fn subscriber_count(&self, folder: &Path) -> usize {
        self.lock()
            .subscribers
            .values()
            .filter(|s| s.folder.as_deref() == Some(folder))
            .count()
    }

    /// Structural broadcast: always delivered, blocking per-subscriber if
    /// its transport is momentarily full. Used for `state`, `status` (via
    /// `Delta::Status`), `api_error`, `ask_user`, `tool_complete` — anything
    /// the spec calls out as exempt from back-pressure skipping.
    pub async fn broadcast_state(&self, folder: &Path, snapshot: &Snapshot) {
        let frame = OutboundFrame::state(&folder_key(folder), snapshot);
        self.broadcast_blocking(folder, frame).await;
    }

    /// Delta-conflation broadcast: structural deltas (`status`, `tool_start`,
    /// `tool_complete`, `ask_user`, `api_error`, `message_start`) always
    /// deliver, blocking per-subscriber if the transport is momentarily
    /// full; only `content`/`thinking_content` flushes skip a saturated
    /// subscriber.
    pub async fn broadcast_delta(&self, folder: &Path, delta: &Delta) {
        let structural = !matches!(delta, Delta::Content { .. } | Delta::ThinkingContent { .. });
        let frame = OutboundFrame::delta(&folder_key(folder), delta);
        if structural {
            self.broadcast_blocking(folder, frame).await;
        } else {
            self.broadcast_skip_saturated(folder, frame);
        }
    }

    async fn broadcast_blocking(&self, folder: &Path, frame: OutboundFrame) {
        let targets = self.targets(folder);
        for (client_id, tx) in targets {
            if tx.send(frame.clone()).await.is_err() {
                self.lock().subscribers.remove(&client_id);
            }
        }
    }

    fn broadcast_skip_saturated(&self, folder: &Path, frame: OutboundFrame) {
        let targets = self.targets(folder);
        let mut dead = Vec::new();
        for (client_id, tx) in targets {
            match tx.try_send(frame.clone()) {
                Ok(()) => {}
                Err(mpsc::error::TrySendError::Full(_)) => {
                    debug!(folder = %folder.display(), client = %client_id, "skipping saturated subscriber for delta flush");
                }
                Err(mpsc::error::TrySendError::Closed(_)) => dead.push(client_id),
            }
        }
        if !dead.is_empty() {
            let mut state = self.lock();
            for id in dead {
                state.subscribers.remove(&id);
            }
        }
    }

    fn unicast(&self, client_id: &ClientId, frame: OutboundFrame) {
        if let Some(sub) = self.lock().subscribers.get(client_id) {
            let _ = sub.tx.try_send(frame);
        }
    }

    /// Sends a keep-alive `ping` to every connected subscriber regardless
    /// of folder binding.
    pub fn ping_all(&self) {
        let mut dead = Vec::new();
        {
            let state = self.lock();
            for (id, sub) in state.subscribers.iter() {
                if sub.tx.try_send(OutboundFrame::ping()).is_err() {
                    dead.push(id.clone());
                }
            }
        }
        if !dead.is_empty() {
            let mut state = self.lock();
            for id in dead {
                state.subscribers.remove(&id);
            }
        }
    }

    /// Spawns the background keep-alive loop. Returns a `JoinHandle` the
    /// caller can abort on shutdown.
    pub fn spawn_keepalive(self) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let mut tick = interval(PING_INTERVAL);
            loop {
                tick.tick().await;
                self.ping_all();
            }
        })
    }

    fn targets(&self, folder: &Path) -> Vec<(ClientId, mpsc::Sender<OutboundFrame>)> {
        self.lock()
            .subscribers
            .iter()
            .filter(|(_, sub)| sub.folder.as_deref() == Some(folder))
            .map(|(id, sub)| (id.clone(), sub.tx.clone()))
            .collect()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HubState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Assigns and returns the next `id:` sequence number for one subscriber's
/// frames — exposed so the per-connection draining task (which owns the
/// actual `Sse` response) can stamp a monotonic reconnect id per write,
/// matching the framing contract in `frame::OutboundFrame::into_event`.
pub fn next_seq(hub: &SseHub, client_id: &ClientId) -> Option<u64> {
    let mut state = hub.lock();
    let sub = state.subscribers.get_mut(client_id)?;
    let seq = sub.seq;
    sub.seq += 1;
    Some(seq)
}

fn folder_key(folder: &Path) -> String {
    folder.to_string_lossy().into_owned()
}

#[cfg(test)]
#[path = "hub_tests.rs"]
mod tests;
