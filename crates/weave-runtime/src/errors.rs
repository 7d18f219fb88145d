//! Runtime error types.

use thiserror::Error;

/// Errors surfaced by the runtime.
///
/// Registry and tracker operations are total and never produce errors;
/// absence is a silent no-op and duplicate cancellation is a boolean.
/// Only the agent invocation boundary can fail.
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// The agent service could not be started at all (spawn failure,
    /// missing binary, broken pipe before the first event).
    #[error("agent unavailable: {0}")]
    AgentUnavailable(String),

    /// The agent started but the turn failed.
    #[error("agent failed: {0}")]
    AgentFailed(String),
}
