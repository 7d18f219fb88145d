//! Event types for the agent invocation stream.
//!
//! [`AgentEvent`]s are the incremental events an agent service yields while
//! processing one turn: a session-id assignment, running text, tool usage,
//! and exactly one terminal event ([`AgentEvent::Completed`] or
//! [`AgentEvent::Failed`]). They are purely in-memory and never persisted.

use serde::{Deserialize, Serialize};

/// Events emitted by the agent service while a turn is being processed.
///
/// The stream for a well-behaved turn yields at most one
/// [`AgentEvent::SessionStarted`] (first turn of a thread), any number of
/// [`AgentEvent::TextUpdate`] / [`AgentEvent::ToolUse`] events, and ends with
/// exactly one terminal event. A cancelled turn's stream may simply end.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum AgentEvent {
    /// The agent assigned (or resumed) its side of the session.
    #[serde(rename = "session_started")]
    SessionStarted {
        /// Agent-side session handle, reusable on later turns of the thread.
        #[serde(rename = "sessionId")]
        session_id: String,
    },

    /// Running assistant text for the turn so far.
    #[serde(rename = "text_update")]
    TextUpdate {
        /// Accumulated assistant text.
        text: String,
    },

    /// The agent invoked a tool.
    #[serde(rename = "tool_use")]
    ToolUse {
        /// Tool activity details.
        #[serde(flatten)]
        activity: ToolActivity,
    },

    /// Terminal success.
    #[serde(rename = "completed")]
    Completed {
        /// Final assistant text.
        text: String,
    },

    /// Terminal failure.
    #[serde(rename = "failed")]
    Failed {
        /// Human-readable error message.
        error: String,
    },
}

impl AgentEvent {
    /// Whether this event ends the turn.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed { .. } | Self::Failed { .. })
    }
}

/// A tool invocation surfaced to progress callbacks.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolActivity {
    /// Tool name.
    pub name: String,
    /// Optional one-line detail (target path, command, query).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl ToolActivity {
    /// Create a tool activity with no detail.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            detail: None,
        }
    }
}

/// Summary delivered alongside a turn's final result.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TurnSummary {
    /// Wall-clock duration of the turn in whole seconds.
    pub duration_seconds: u64,
    /// Number of tool invocations observed during the turn.
    pub tool_call_count: u32,
}
