// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Session actor: owns one Worker subprocess, the `StateBuilder` that
//! watches it, and the three timers that govern its lifecycle.
//!
//! Everything here runs on a single `tokio::task` — the actor never shares
//! its mutable state with a lock. Callers reach it exclusively through the
//! [`crate::handle::SessionHandle`] mailbox.

use std::collections::{HashMap, VecDeque};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use bridge_core::{
    AgentSessionId, BlockDelta, ContinuationMode, DeltaKey, DeltaKind, PromptContent,
    QueuedPrompt, StdinMessage, StreamEvent, UserContent, UserEvent, UserMessage, WorkerEvent,
};
use bridge_state::{Delta, StateBuilder, Status};
use bridge_worker::{WorkerHandle, WorkerIoEvent};
use tokio::sync::{broadcast, mpsc};
use tracing::warn;

use crate::config::{SessionConfig, GRACE_ARM_SUPPRESSION};
use crate::error::SessionError;
use crate::handle::{PromptOutcome, SessionBroadcast, SessionCommand, SessionHandle, TurnSummary};
use crate::push::PushNotifier;
use crate::timers::ArmableTimer;

const SUBSCRIBER_CHANNEL_CAPACITY: usize = 32;
const COMMAND_CHANNEL_CAPACITY: usize = 32;

/// How much of the journal's tail to re-parse when a turn produced no
/// streamed content, looking for a local-command-output echo.
const JOURNAL_TAIL_BYTES: usize = 8 * 1024;

/// Everything `actor::spawn` needs to stand up a Session.
pub struct SpawnOptions {
    pub id: AgentSessionId,
    pub folder: PathBuf,
    pub resumable: bool,
    pub config: SessionConfig,
    pub push: Arc<dyn PushNotifier>,
    /// A fully-formed auto-resume message to deliver on the first client
    /// attach, if the Worker is being resumed after a crash or external
    /// restart. `None` for an ordinary fresh or deliberate-resume start.
    pub auto_resume: Option<String>,
}

/// One folder's supervisor: a Worker subprocess plus the state it drives.
struct SessionActor {
    id: AgentSessionId,
    folder: PathBuf,
    resumable: bool,
    config: SessionConfig,
    push: Arc<dyn PushNotifier>,

    worker: Option<WorkerHandle>,
    state: StateBuilder,

    commands: mpsc::Receiver<SessionCommand>,
    broadcast: broadcast::Sender<SessionBroadcast>,

    flush_timer: ArmableTimer,
    init_timer: ArmableTimer,
    grace_timer: ArmableTimer,

    pending_deltas: HashMap<DeltaKey, bridge_core::DeltaPayload>,
    prompt_queue: VecDeque<QueuedPrompt>,

    turn_in_progress: bool,
    turn_started_at: Option<Instant>,
    had_content_this_turn: bool,
    pushed_ask_this_turn: bool,
    last_prompt_at: Option<Instant>,

    pending_auto_resume: Option<String>,

    /// Count of SSE clients currently bound to this folder, maintained via
    /// `ClientAttached`/`ClientDetached` rather than the broadcast channel's
    /// own receiver count — the broadcast stream always has exactly one
    /// subscriber in practice (the relay task that forwards it into the SSE
    /// hub), so that count can never tell "nobody is watching" apart from
    /// "the relay is alive".
    attached_clients: usize,
}

/// Whether the run loop should keep going after handling a command.
enum Control {
    Continue,
    Stop,
}

/// Spawns a Session actor and returns a handle to it. The actor does not
/// spawn its Worker eagerly — that happens lazily on the first prompt (or
/// the auto-resume nudge), matching the spec's "no process until there is
/// something to say" posture.
pub fn spawn(options: SpawnOptions) -> SessionHandle {
    let (command_tx, command_rx) = mpsc::channel(COMMAND_CHANNEL_CAPACITY);
    let (broadcast_tx, _) = broadcast::channel(SUBSCRIBER_CHANNEL_CAPACITY);

    let handle = SessionHandle::new(
        options.id.clone(),
        options.folder.clone(),
        options.resumable,
        command_tx,
        broadcast_tx.clone(),
    );

    let actor = SessionActor {
        id: options.id,
        folder: options.folder,
        resumable: options.resumable,
        config: options.config,
        push: options.push,
        worker: None,
        state: StateBuilder::new(),
        commands: command_rx,
        broadcast: broadcast_tx,
        flush_timer: ArmableTimer::new(),
        init_timer: ArmableTimer::new(),
        grace_timer: ArmableTimer::new(),
        pending_deltas: HashMap::new(),
        prompt_queue: VecDeque::new(),
        turn_in_progress: false,
        turn_started_at: None,
        had_content_this_turn: false,
        pushed_ask_this_turn: false,
        last_prompt_at: None,
        pending_auto_resume: options.auto_resume,
        attached_clients: 0,
    };

    tokio::spawn(actor.run());
    handle
}

impl SessionActor {
    async fn run(mut self) {
        self.replay_journal().await;
        self.init_timer.arm_after(self.config.init_timeout);

        loop {
            let worker_event = async {
                match self.worker.as_mut() {
                    Some(worker) => worker.next_event().await,
                    None => std::future::pending::<WorkerIoEvent>().await,
                }
            };

            tokio::select! {
                command = self.commands.recv() => {
                    match command {
                        Some(command) => {
                            if matches!(self.handle_command(command).await, Control::Stop) {
                                break;
                            }
                        }
                        None => break,
                    }
                }
                event = worker_event => {
                    match event {
                        WorkerIoEvent::Line(line) => self.handle_worker_line(&line).await,
                        WorkerIoEvent::Eof => {}
                        WorkerIoEvent::Exited(status) => self.handle_worker_exit(status).await,
                    }
                }
                _ = self.flush_timer.tick() => {
                    self.flush_pending_deltas();
                }
                _ = self.init_timer.tick() => {
                    self.init_timer.cancel();
                    self.handle_init_timeout().await;
                }
                _ = self.grace_timer.tick() => {
                    self.grace_timer.cancel();
                    self.teardown_worker(false).await;
                    let _ = self.broadcast.send(SessionBroadcast::Exited);
                    break;
                }
            }
        }

        self.teardown_worker(false).await;
    }

    /// Rebuilds a resumed Session's conversation from the Worker's own
    /// on-disk journal before the actor serves its first snapshot — a
    /// resumed Session with `resumable=true` otherwise starts with an empty
    /// snapshot and a client attaching after a restart sees no history.
    async fn replay_journal(&mut self) {
        if !self.resumable {
            return;
        }
        let Some(path) = crate::journal_path::find_journal_path(
            &self.folder,
            self.id.as_str(),
            &self.config.claude_base,
        ) else {
            return;
        };
        let Ok(contents) = tokio::fs::read_to_string(&path).await else {
            return;
        };
        let parsed = bridge_core::parse_journal(&contents);
        if parsed.malformed_lines > 0 {
            warn!(
                folder = %self.folder.display(),
                malformed_lines = parsed.malformed_lines,
                "skipped malformed journal lines during replay"
            );
        }
        self.state.replay_from_jsonl(&parsed.events);
    }

    async fn handle_command(&mut self, command: SessionCommand) -> Control {
        match command {
            SessionCommand::Prompt { prompt, reply } => {
                let outcome = self.handle_prompt(prompt).await;
                let _ = reply.send(outcome);
                Control::Continue
            }
            SessionCommand::Abort { reply } => {
                self.handle_abort().await;
                let _ = reply.send(());
                Control::Continue
            }
            SessionCommand::Exit { reply } => {
                self.handle_exit().await;
                let _ = reply.send(());
                Control::Stop
            }
            SessionCommand::Snapshot { reply } => {
                let _ = reply.send(self.state.snapshot().clone());
                Control::Continue
            }
            SessionCommand::ClientAttached => {
                self.attached_clients += 1;
                self.grace_timer.cancel();
                self.handle_client_attached().await;
                Control::Continue
            }
            SessionCommand::ClientDetached => {
                self.attached_clients = self.attached_clients.saturating_sub(1);
                self.maybe_start_grace_timer();
                Control::Continue
            }
            SessionCommand::TurnInProgress { reply } => {
                let _ = reply.send(self.turn_in_progress);
                Control::Continue
            }
            SessionCommand::Shutdown { reply } => {
                self.teardown_worker(false).await;
                let _ = self.broadcast.send(SessionBroadcast::Exited);
                let _ = reply.send(());
                Control::Stop
            }
        }
    }

    async fn handle_prompt(&mut self, prompt: QueuedPrompt) -> Result<PromptOutcome, SessionError> {
        if is_exit_command(&prompt) {
            self.handle_exit().await;
            return Ok(PromptOutcome::Delivered);
        }
        if is_abort_command(&prompt) {
            self.handle_abort().await;
            return Ok(PromptOutcome::Delivered);
        }

        if self.worker.is_none() {
            self.ensure_worker().await?;
        }

        if self.turn_in_progress {
            self.inject_user_message(&prompt);
            self.prompt_queue.push_back(prompt);
            let position = self.prompt_queue.len();
            if self.config.outrider_nudge_enabled && position == 1 {
                self.send_outrider_nudge().await;
            }
            return Ok(PromptOutcome::Queued { position });
        }

        self.deliver_prompt(prompt, false).await?;
        Ok(PromptOutcome::Delivered)
    }

    async fn ensure_worker(&mut self) -> Result<(), SessionError> {
        if self.worker.is_some() {
            return Ok(());
        }
        let mode = if self.resumable {
            ContinuationMode::Resume(self.id.as_str().to_string())
        } else {
            ContinuationMode::Fresh(self.id.as_str().to_string())
        };
        let argv = bridge_core::build_worker_argv(&mode, self.config.mcp_config.as_deref());
        let worker =
            bridge_worker::spawn(&self.config.worker_program, &argv, &self.folder, filtered_env())
                .await?;
        let pid = worker.pid();
        self.worker = Some(worker);
        self.resumable = true;
        self.init_timer.arm_after(self.config.init_timeout);
        let _ = self.broadcast.send(SessionBroadcast::WorkerSpawned { pid });
        Ok(())
    }

    /// Injects a synthetic `user` event into `StateBuilder` immediately, so a
    /// client sees its own message without waiting for the Worker's echo
    /// (which is filtered out as a duplicate when it arrives).
    fn inject_user_message(&mut self, prompt: &QueuedPrompt) {
        let Some(text) = prompt.text.as_ref().filter(|text| !text.is_empty()) else {
            return;
        };
        let event = WorkerEvent::User(UserEvent {
            message: UserMessage {
                role: "user".to_string(),
                content: UserContent::Text(text.clone()),
            },
        });
        let deltas = self.state.handle_event(&event);
        for delta in deltas {
            self.broadcast_delta(delta);
        }
    }

    async fn deliver_prompt(
        &mut self,
        prompt: QueuedPrompt,
        skip_state_message: bool,
    ) -> Result<(), SessionError> {
        if self.worker.is_none() {
            self.ensure_worker().await?;
        }
        self.grace_timer.cancel();
        self.last_prompt_at = Some(Instant::now());

        if !skip_state_message {
            self.inject_user_message(&prompt);
        }

        let content = to_prompt_content(prompt);
        let message = StdinMessage::user(content);
        let line = serde_json::to_string(&message)?;

        let Some(worker) = self.worker.as_mut() else {
            return Err(SessionError::WorkerNotRunning);
        };
        if let Err(err) = worker.write_line(&line).await {
            self.broadcast_delta(Delta::ApiError {
                message: format!("failed to deliver prompt: {err}"),
            });
            return Err(SessionError::StdinWrite(err));
        }

        self.turn_in_progress = true;
        self.turn_started_at = Some(Instant::now());
        self.had_content_this_turn = false;
        Ok(())
    }

    async fn send_outrider_nudge(&mut self) {
        let Some(worker) = self.worker.as_mut() else {
            return;
        };
        let nudge = StdinMessage::user(PromptContent::Text(format!(
            "{} a follow-up message is waiting; wrap up the current step when convenient.",
            bridge_state::SYNTHETIC_PREFIX
        )));
        if let Ok(line) = serde_json::to_string(&nudge) {
            let _ = worker.write_line(&line).await;
        }
    }

    async fn handle_worker_line(&mut self, line: &str) {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return;
        }

        let event: WorkerEvent = match serde_json::from_str(trimmed) {
            Ok(event) => event,
            Err(err) => {
                warn!(error = %err, folder = %self.folder.display(), "unparseable worker line");
                return;
            }
        };

        if let WorkerEvent::User(user) = &event {
            if bridge_core::is_user_text_echo(user) {
                return;
            }
        }

        if let WorkerEvent::System(_) = &event {
            self.init_timer.cancel();
        }

        if let Some((key, fragment)) = delta_key_of(&event) {
            self.pending_deltas
                .entry(key)
                .or_insert_with(|| bridge_core::new_payload(key.1, ""))
                .append(&fragment);
            if !self.flush_timer.is_armed() {
                self.flush_timer.arm_after(self.config.flush_interval);
            }
            return;
        }

        self.flush_pending_deltas();

        let is_result = matches!(event, WorkerEvent::Result(_));
        let is_api_error =
            matches!(&event, WorkerEvent::Assistant(assistant) if assistant.is_api_error_message);

        let deltas = self.state.handle_event(&event);
        let had_ask_user = deltas.iter().any(|delta| matches!(delta, Delta::AskUser { .. }));
        for delta in deltas {
            self.broadcast_delta(delta);
        }

        if had_ask_user && self.attached_clients == 0 {
            self.push.notify_ask_user(&self.folder);
            self.pushed_ask_this_turn = true;
        }

        if is_result || is_api_error {
            self.on_turn_complete().await;
        }
    }

    fn broadcast_delta(&mut self, delta: Delta) {
        if !matches!(delta, Delta::Status { .. }) {
            self.had_content_this_turn = true;
        }
        let _ = self.broadcast.send(SessionBroadcast::Delta(delta));
    }

    /// Drains `pending_deltas`, feeding a synthesized `content_block_delta`
    /// through `StateBuilder` for each bucket (so its own per-block
    /// accumulators stay correct) and broadcasting the fragment directly for
    /// live-streaming UX. Must run before any non-delta event is handed to
    /// `StateBuilder`, so block-stop sees the full accumulated text.
    fn flush_pending_deltas(&mut self) {
        self.flush_timer.cancel();
        if self.pending_deltas.is_empty() {
            return;
        }
        let pending = std::mem::take(&mut self.pending_deltas);
        for ((index, kind), payload) in pending {
            let fragment = payload.as_str().to_string();
            let synthetic = synthesize_delta_event(index, kind, fragment.clone());
            let _ = self.state.handle_event(&synthetic);

            match kind {
                DeltaKind::Text => self.broadcast_delta(Delta::Content { index, text: fragment }),
                DeltaKind::Thinking => {
                    self.broadcast_delta(Delta::ThinkingContent { index, text: fragment })
                }
                // Partial tool input JSON has no user-facing meaning until
                // `tool_start` fires at block-stop.
                DeltaKind::InputJson => {}
            }
        }
    }

    async fn on_turn_complete(&mut self) {
        let duration_ms = self
            .turn_started_at
            .take()
            .map(|started| started.elapsed().as_millis() as u64)
            .unwrap_or(0);
        self.turn_in_progress = false;

        if !self.had_content_this_turn {
            self.recover_local_command_output().await;
        }
        self.had_content_this_turn = false;

        let snapshot = self.state.snapshot().clone();
        let context_pct = snapshot.meta.context_pct;
        let _ = self.broadcast.send(SessionBroadcast::State(snapshot));

        let summary = TurnSummary {
            metrics: self.state.turn_metrics(),
            duration_ms,
            context_pct,
        };
        let _ = self.broadcast.send(SessionBroadcast::TurnComplete(summary));

        if self.attached_clients == 0 && !self.pushed_ask_this_turn {
            self.push.notify_turn_complete(&self.folder);
        }
        self.pushed_ask_this_turn = false;

        if !self.prompt_queue.is_empty() {
            let queued: Vec<_> = self.prompt_queue.drain(..).collect();
            let coalesced = bridge_core::coalesce_prompts(queued);
            // The state-builder message for each queued prompt was already
            // injected when it was queued, so this delivery skips it.
            let _ = self.deliver_prompt(coalesced, true).await;
        }

        self.maybe_start_grace_timer();
    }

    /// A turn that streamed no content was probably a local slash command
    /// (`/context`, `/cost`, ...) answered entirely from the journal. Pull
    /// its echoed output back out of the journal tail and feed it through
    /// `StateBuilder` so the client still sees it.
    async fn recover_local_command_output(&mut self) {
        let Some(path) =
            crate::journal_path::find_journal_path(&self.folder, self.id.as_str(), &self.config.claude_base)
        else {
            return;
        };
        let Ok(bytes) = tokio::fs::read(&path).await else {
            return;
        };
        let tail_start = bytes.len().saturating_sub(JOURNAL_TAIL_BYTES);
        let tail = String::from_utf8_lossy(&bytes[tail_start..]);
        let parsed = bridge_core::parse_journal(&tail);

        let marker = parsed.events.into_iter().rev().find(|wrapped| {
            matches!(
                &wrapped.event,
                WorkerEvent::User(user)
                    if matches!(
                        &user.message.content,
                        UserContent::Text(text)
                            if text.starts_with(bridge_core::echo::LOCAL_COMMAND_OUTPUT_MARKER)
                    )
            )
        });

        if let Some(wrapped) = marker {
            let deltas = self.state.handle_event(&wrapped.event);
            for delta in deltas {
                self.broadcast_delta(delta);
            }
        }
    }

    async fn handle_client_attached(&mut self) {
        let Some(message) = self.pending_auto_resume.take() else {
            return;
        };
        let prompt = QueuedPrompt {
            text: Some(message),
            content: None,
        };
        if self.worker.is_none() {
            if self.ensure_worker().await.is_err() {
                return;
            }
        }
        if self.turn_in_progress {
            self.inject_user_message(&prompt);
            self.prompt_queue.push_back(prompt);
        } else {
            let _ = self.deliver_prompt(prompt, false).await;
        }
    }

    async fn handle_abort(&mut self) {
        self.teardown_worker(false).await;
        self.broadcast_delta(Delta::Status { status: Status::Idle });
    }

    async fn handle_exit(&mut self) {
        self.teardown_worker(true).await;
        let snapshot = self.state.snapshot().clone();
        let _ = self.broadcast.send(SessionBroadcast::State(snapshot));
        let _ = self.broadcast.send(SessionBroadcast::Exited);
    }

    async fn handle_init_timeout(&mut self) {
        let Some(worker) = self.worker.take() else {
            return;
        };
        bridge_worker::kill_with_escalation(worker.pid(), self.config.kill_escalation_grace).await;
        self.turn_in_progress = false;
        self.broadcast_delta(Delta::ApiError {
            message: "worker did not report ready before the init timeout".to_string(),
        });
    }

    async fn handle_worker_exit(&mut self, status: std::io::Result<std::process::ExitStatus>) {
        self.flush_pending_deltas();
        self.worker = None;
        self.init_timer.cancel();
        self.turn_in_progress = false;
        self.prompt_queue.clear();

        let reason = match status {
            Ok(status) if status.success() => "worker exited".to_string(),
            Ok(status) => format!("worker exited with {status}"),
            Err(err) => format!("failed to wait on worker: {err}"),
        };
        let _ = self.broadcast.send(SessionBroadcast::Error(reason));
    }

    async fn teardown_worker(&mut self, write_exit_marker: bool) {
        self.flush_timer.cancel();
        self.init_timer.cancel();
        self.grace_timer.cancel();
        self.flush_pending_deltas();

        if let Some(worker) = self.worker.take() {
            bridge_worker::kill_with_escalation(worker.pid(), self.config.kill_escalation_grace).await;
        }
        self.turn_in_progress = false;
        self.prompt_queue.clear();

        if write_exit_marker {
            if let Err(err) =
                crate::resolve_io::write_exit_marker(&self.config.state_dir, self.id.as_str()).await
            {
                warn!(error = %err, folder = %self.folder.display(), "failed to write exit marker");
            }
        }
    }

    /// Arms the grace timer iff there is a live Worker, no turn in flight, no
    /// subscriber watching, and the last prompt (if any) is old enough that
    /// this doesn't look like a client simply reconnecting mid-conversation.
    fn maybe_start_grace_timer(&mut self) {
        if self.worker.is_none() || self.turn_in_progress {
            return;
        }
        if self.attached_clients > 0 {
            return;
        }
        if self.grace_timer.is_armed() {
            return;
        }
        let suppressed = self
            .last_prompt_at
            .map(|at| at.elapsed() < GRACE_ARM_SUPPRESSION)
            .unwrap_or(false);
        if suppressed {
            return;
        }
        self.grace_timer.arm_after(self.config.grace_ms);
    }
}

fn is_exit_command(prompt: &QueuedPrompt) -> bool {
    prompt.content.is_none() && prompt.text.as_deref().map(str::trim) == Some("/exit")
}

fn is_abort_command(prompt: &QueuedPrompt) -> bool {
    prompt.content.is_none() && prompt.text.as_deref().map(str::trim) == Some("/abort")
}

fn to_prompt_content(prompt: QueuedPrompt) -> PromptContent {
    match (prompt.text, prompt.content) {
        (Some(text), None) => PromptContent::Text(text),
        (None, Some(blocks)) => PromptContent::Blocks(blocks),
        (Some(text), Some(mut blocks)) => {
            blocks.insert(0, serde_json::json!({ "type": "text", "text": text }));
            PromptContent::Blocks(blocks)
        }
        (None, None) => PromptContent::Empty,
    }
}

fn delta_key_of(event: &WorkerEvent) -> Option<(DeltaKey, String)> {
    let WorkerEvent::StreamEvent { event } = event else {
        return None;
    };
    let (key, fragment) = bridge_core::classify_delta(event)?;
    Some((key, fragment.to_string()))
}

fn synthesize_delta_event(index: usize, kind: DeltaKind, fragment: String) -> WorkerEvent {
    let delta = match kind {
        DeltaKind::Text => BlockDelta::TextDelta { text: fragment },
        DeltaKind::InputJson => BlockDelta::InputJsonDelta { partial_json: fragment },
        DeltaKind::Thinking => BlockDelta::Thinking { thinking: fragment },
    };
    WorkerEvent::StreamEvent {
        event: StreamEvent::ContentBlockDelta { index, delta },
    }
}

/// The bridge's own environment minus the Worker-confusing variables set
/// when the bridge itself is run from inside a Worker session.
fn filtered_env() -> Vec<(String, String)> {
    std::env::vars()
        .filter(|(key, _)| !bridge_core::STRIPPED_ENV_VARS.contains(&key.as_str()))
        .collect()
}

#[cfg(test)]
#[path = "actor_tests.rs"]
mod tests;
