// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The external API for talking to a Session actor.
//!
//! Callers (HTTP handlers) never touch the actor's state directly — every
//! interaction crosses its command mailbox, matching the actor pattern the
//! teacher uses for its per-agent background watcher (`shutdown_tx` +
//! message passing rather than a shared mutex).

use bridge_core::QueuedPrompt;
use bridge_state::{Delta, Snapshot, TurnMetrics};
use tokio::sync::{broadcast, mpsc, oneshot};

use crate::error::SessionError;

/// Outcome of delivering (or queueing) a prompt.
#[derive(Debug, Clone, PartialEq)]
pub enum PromptOutcome {
    Delivered,
    Queued { position: usize },
}

/// Turn-level metrics enriched with the timing-and-context data only the
/// Session actor knows (`bridge_state::TurnMetrics` tracks token/tool counts
/// alone — it has no notion of wall-clock duration or the Worker's own
/// context-window percentage).
#[derive(Debug, Clone, PartialEq)]
pub struct TurnSummary {
    pub metrics: TurnMetrics,
    pub duration_ms: u64,
    pub context_pct: Option<f64>,
}

/// Broadcast events a subscriber (SSE hub) consumes for one folder.
///
/// Back-pressure-aware selective skip is the subscriber's concern, not the
/// Session's — this is a plain unbounded fan-out of everything the Session
/// produces; `bridge-sse` decides per-connection whether a `Delta` frame can
/// be dropped under a slow writer. Structural events (`State`, `TurnComplete`,
/// `Exited`) are never dropped.
#[derive(Debug, Clone)]
pub enum SessionBroadcast {
    Delta(Delta),
    State(Snapshot),
    TurnComplete(TurnSummary),
    /// The Worker process exited non-zero mid-turn, or the Session is
    /// tearing down; carries a human-readable reason.
    Error(String),
    Exited,
    /// A Worker subprocess just came up under this Session, with its pid —
    /// `bridge-daemon` uses this to keep the persisted active-Worker record
    /// list (consulted by the orphan reaper on next startup) up to date.
    WorkerSpawned { pid: u32 },
}

pub(crate) enum SessionCommand {
    Prompt {
        prompt: QueuedPrompt,
        reply: oneshot::Sender<Result<PromptOutcome, SessionError>>,
    },
    Abort {
        reply: oneshot::Sender<()>,
    },
    Exit {
        reply: oneshot::Sender<()>,
    },
    Snapshot {
        reply: oneshot::Sender<Snapshot>,
    },
    /// A client just bound to this folder; triggers a one-shot auto-resume
    /// nudge on the first attach after a crash/restart. Fire-and-forget.
    ClientAttached,
    /// A client just unbound from this folder; re-evaluates the grace timer
    /// immediately rather than waiting for the next turn. Fire-and-forget.
    ClientDetached,
    TurnInProgress {
        reply: oneshot::Sender<bool>,
    },
    /// Tears the Worker down like `Exit`, but does not write the exit
    /// marker — used for a bridge-wide graceful shutdown, where the folder
    /// should still resume on next start rather than be treated as a
    /// deliberate close.
    Shutdown {
        reply: oneshot::Sender<()>,
    },
}

/// A cheap, cloneable handle to a running Session actor.
#[derive(Clone)]
pub struct SessionHandle {
    pub(crate) id: bridge_core::AgentSessionId,
    pub(crate) folder: std::path::PathBuf,
    pub(crate) resumable: bool,
    pub(crate) commands: mpsc::Sender<SessionCommand>,
    pub(crate) events: broadcast::Sender<SessionBroadcast>,
}

impl SessionHandle {
    pub(crate) fn new(
        id: bridge_core::AgentSessionId,
        folder: std::path::PathBuf,
        resumable: bool,
        commands: mpsc::Sender<SessionCommand>,
        events: broadcast::Sender<SessionBroadcast>,
    ) -> Self {
        Self {
            id,
            folder,
            resumable,
            commands,
            events,
        }
    }

    pub fn id(&self) -> &bridge_core::AgentSessionId {
        &self.id
    }

    pub fn folder(&self) -> &std::path::Path {
        &self.folder
    }

    pub fn resumable(&self) -> bool {
        self.resumable
    }

    /// Subscribes to this Session's broadcast stream. Each call yields an
    /// independent receiver; `tokio::sync::broadcast`'s own lag handling
    /// covers a subscriber that stops polling entirely.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionBroadcast> {
        self.events.subscribe()
    }

    /// Count of live broadcast subscribers. In practice this is the single
    /// relay task forwarding into the SSE hub, not a per-client count — see
    /// `client_attached`/`client_detached` for the signal the grace timer
    /// actually uses.
    pub fn subscriber_count(&self) -> usize {
        self.events.receiver_count()
    }

    pub async fn deliver_prompt(
        &self,
        prompt: QueuedPrompt,
    ) -> Result<PromptOutcome, SessionError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.commands
            .send(SessionCommand::Prompt {
                prompt,
                reply: reply_tx,
            })
            .await
            .map_err(|_| SessionError::ActorGone)?;
        reply_rx.await.map_err(|_| SessionError::ActorGone)?
    }

    pub async fn abort(&self) -> Result<(), SessionError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.commands
            .send(SessionCommand::Abort { reply: reply_tx })
            .await
            .map_err(|_| SessionError::ActorGone)?;
        reply_rx.await.map_err(|_| SessionError::ActorGone)
    }

    pub async fn exit(&self) -> Result<(), SessionError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.commands
            .send(SessionCommand::Exit { reply: reply_tx })
            .await
            .map_err(|_| SessionError::ActorGone)?;
        reply_rx.await.map_err(|_| SessionError::ActorGone)
    }

    /// Notifies the actor a subscriber just attached. Best-effort: a full
    /// mailbox or a gone actor is not worth surfacing to an HTTP caller
    /// whose own SSE connection is the thing that just succeeded.
    pub fn client_attached(&self) {
        let _ = self.commands.try_send(SessionCommand::ClientAttached);
    }

    pub fn client_detached(&self) {
        let _ = self.commands.try_send(SessionCommand::ClientDetached);
    }

    pub async fn snapshot(&self) -> Result<Snapshot, SessionError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.commands
            .send(SessionCommand::Snapshot { reply: reply_tx })
            .await
            .map_err(|_| SessionError::ActorGone)?;
        reply_rx.await.map_err(|_| SessionError::ActorGone)
    }

    pub async fn turn_in_progress(&self) -> Result<bool, SessionError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.commands
            .send(SessionCommand::TurnInProgress { reply: reply_tx })
            .await
            .map_err(|_| SessionError::ActorGone)?;
        reply_rx.await.map_err(|_| SessionError::ActorGone)
    }

    /// Tears the Worker down like [`Self::exit`], but leaves no exit marker —
    /// the folder resumes normally on the next start. Used for a bridge-wide
    /// graceful shutdown.
    pub async fn shutdown(&self) -> Result<(), SessionError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.commands
            .send(SessionCommand::Shutdown { reply: reply_tx })
            .await
            .map_err(|_| SessionError::ActorGone)?;
        reply_rx.await.map_err(|_| SessionError::ActorGone)
    }
}

#[cfg(test)]
impl SessionHandle {
    /// A handle backed by a mailbox nobody is reading — only useful for
    /// exercising registry bookkeeping, never for actually delivering a
    /// command.
    pub(crate) fn dangling(id: bridge_core::AgentSessionId, folder: std::path::PathBuf) -> Self {
        let (commands, _rx) = mpsc::channel(1);
        let (events, _rx) = broadcast::channel(1);
        Self {
            id,
            folder,
            resumable: false,
            commands,
            events,
        }
    }
}
