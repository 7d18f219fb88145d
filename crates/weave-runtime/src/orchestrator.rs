//! Orchestrator — drives one agent turn per thread end-to-end.
//!
//! Protocol for a turn: look up or create the thread's session, register
//! the turn's handler, invoke the agent with the session's prior agent-side
//! id and current cancellation token, then pump the event stream. Every
//! delivery re-checks the turn tracker first; the terminal callback removes
//! the entry before delivering, so it is always the last callback a sink
//! receives and no late progress event can interleave behind it.

use std::sync::Arc;
use std::time::Instant;

use futures::StreamExt;
use metrics::{counter, gauge, histogram};
use parking_lot::Mutex;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;
use weave_core::{AgentEvent, SurfaceId, ThreadKey, TurnKey, TurnSummary};

use crate::agent::{AgentRequest, AgentService};
use crate::errors::RuntimeError;
use crate::registry::SessionRegistry;
use crate::sink::TurnSink;
use crate::tracker::TurnTracker;

/// How a turn ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TurnOutcome {
    /// Terminal success delivered.
    Completed,
    /// Terminal failure delivered.
    Failed,
    /// The turn was cancelled; its remaining output was dropped.
    Cancelled,
}

impl TurnOutcome {
    fn label(self) -> &'static str {
        match self {
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
        }
    }
}

/// Result of a cancel request.
pub struct AbortOutcome {
    /// Whether an un-fired cancellation token was fired.
    pub cancelled: bool,
    /// The handler that was tracking the turn, removed from the tracker.
    /// The adapter uses it for its "stopped" notice.
    pub handler: Option<Arc<dyn TurnSink>>,
}

/// Coordinates sessions, in-flight turns, and the agent collaborator.
pub struct Orchestrator {
    registry: Arc<SessionRegistry>,
    agent: Arc<dyn AgentService>,
    /// In-flight turns keyed by `(surface, thread)`.
    turns: Mutex<TurnTracker>,
}

impl Orchestrator {
    /// Create an orchestrator over an injected registry and agent service.
    pub fn new(registry: Arc<SessionRegistry>, agent: Arc<dyn AgentService>) -> Self {
        Self {
            registry,
            agent,
            turns: Mutex::new(TurnTracker::new()),
        }
    }

    /// The session registry.
    pub fn registry(&self) -> &Arc<SessionRegistry> {
        &self.registry
    }

    /// Whether a turn is live for the key.
    pub fn has_active_turn(&self, surface: &SurfaceId, thread: &ThreadKey) -> bool {
        self.turns
            .lock()
            .contains(&TurnKey::new(surface.clone(), thread.clone()))
    }

    /// Number of live turns.
    pub fn active_turn_count(&self) -> usize {
        self.turns.lock().len()
    }

    /// Run one agent turn end-to-end.
    ///
    /// Progress events are delivered in emission order; the result or error
    /// callback is always the last delivery for the turn. The agent failing
    /// is surfaced exactly once via `on_error` and never retried here.
    #[instrument(skip(self, query, sink), fields(surface = %surface, thread = %thread))]
    pub async fn run_turn(
        &self,
        surface: &SurfaceId,
        thread: &ThreadKey,
        query: &str,
        sink: Arc<dyn TurnSink>,
    ) -> Result<TurnOutcome, RuntimeError> {
        let turn_id = Uuid::now_v7();
        let session = self.registry.get_or_create(thread);
        let cancel = session.cancellation_token();
        let key = TurnKey::new(surface.clone(), thread.clone());

        self.register(key.clone(), sink);
        info!(%turn_id, "turn started");

        let started = Instant::now();
        let request = AgentRequest {
            prompt: query.to_owned(),
            resume_session_id: session.agent_session_id(),
            cancel,
        };

        let mut stream = match self.agent.invoke(request).await {
            Ok(stream) => stream,
            Err(err) => {
                warn!(%turn_id, error = %err, "agent invocation failed to start");
                if let Some(sink) = self.take(&key) {
                    sink.on_error(&err.to_string()).await;
                }
                self.finish(TurnOutcome::Failed, started);
                return Err(err);
            }
        };

        let mut tool_calls: u32 = 0;
        let mut running_text = String::new();
        let mut outcome = None;

        while let Some(event) = stream.next().await {
            match event {
                AgentEvent::SessionStarted { session_id } => {
                    debug!(%turn_id, agent_session_id = %session_id, "agent session assigned");
                    self.registry.update_agent_session_id(thread, &session_id);
                }
                AgentEvent::TextUpdate { text } => {
                    running_text = text;
                    // Gate: a removed entry means the turn was cancelled.
                    let Some(sink) = self.current(&key) else {
                        continue;
                    };
                    sink.on_progress(&running_text, None, started.elapsed().as_secs(), tool_calls)
                        .await;
                }
                AgentEvent::ToolUse { activity } => {
                    tool_calls += 1;
                    let Some(sink) = self.current(&key) else {
                        continue;
                    };
                    sink.on_progress(
                        &running_text,
                        Some(&activity),
                        started.elapsed().as_secs(),
                        tool_calls,
                    )
                    .await;
                }
                AgentEvent::Completed { text } => {
                    // Remove before delivering so nothing can interleave
                    // behind the terminal callback.
                    if let Some(sink) = self.take(&key) {
                        let summary = TurnSummary {
                            duration_seconds: started.elapsed().as_secs(),
                            tool_call_count: tool_calls,
                        };
                        sink.on_result(&text, summary).await;
                        outcome = Some(TurnOutcome::Completed);
                    } else {
                        outcome = Some(TurnOutcome::Cancelled);
                    }
                    break;
                }
                AgentEvent::Failed { error } => {
                    warn!(%turn_id, error = %error, "agent reported failure");
                    if let Some(sink) = self.take(&key) {
                        sink.on_error(&error).await;
                        outcome = Some(TurnOutcome::Failed);
                    } else {
                        outcome = Some(TurnOutcome::Cancelled);
                    }
                    break;
                }
            }
        }

        let outcome = match outcome {
            Some(outcome) => outcome,
            // Stream ended without a terminal event: normal for a cancelled
            // turn, an agent defect otherwise.
            None => {
                if let Some(sink) = self.take(&key) {
                    warn!(%turn_id, "agent stream ended without a terminal event");
                    sink.on_error("agent stream ended without a result").await;
                    TurnOutcome::Failed
                } else {
                    TurnOutcome::Cancelled
                }
            }
        };

        info!(
            %turn_id,
            outcome = outcome.label(),
            tool_calls,
            duration_secs = started.elapsed().as_secs(),
            "turn finished"
        );
        self.finish(outcome, started);
        Ok(outcome)
    }

    /// Cancel the in-flight turn for a key.
    ///
    /// Removes the tracker entry first — from that point no further
    /// callback reaches the handler — then fires the thread's cancellation
    /// token via the registry.
    #[instrument(skip(self), fields(surface = %surface, thread = %thread))]
    pub fn abort_turn(&self, surface: &SurfaceId, thread: &ThreadKey) -> AbortOutcome {
        let key = TurnKey::new(surface.clone(), thread.clone());
        let handler = self.take(&key);
        let cancelled = self.registry.abort(thread);
        if cancelled {
            info!("turn aborted");
        }
        AbortOutcome { cancelled, handler }
    }

    fn register(&self, key: TurnKey, sink: Arc<dyn TurnSink>) {
        let mut turns = self.turns.lock();
        turns.register(key, sink);
        gauge!("weave_turns_active").set(turns.len() as f64);
    }

    fn current(&self, key: &TurnKey) -> Option<Arc<dyn TurnSink>> {
        self.turns.lock().get(key)
    }

    fn take(&self, key: &TurnKey) -> Option<Arc<dyn TurnSink>> {
        let mut turns = self.turns.lock();
        let sink = turns.unregister(key);
        gauge!("weave_turns_active").set(turns.len() as f64);
        sink
    }

    fn finish(&self, outcome: TurnOutcome, started: Instant) {
        counter!("weave_turns_total", "outcome" => outcome.label()).increment(1);
        histogram!("weave_turn_duration_seconds").record(started.elapsed().as_secs_f64());
    }
}
