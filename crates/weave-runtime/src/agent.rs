//! Agent invocation seam.
//!
//! The runtime never talks to a concrete agent directly; it drives whatever
//! implements [`AgentService`]. The service returns a stream of
//! [`AgentEvent`]s for one turn and is expected to honor the request's
//! cancellation token cooperatively — work already queued when the token
//! fires may still complete, and its output is dropped by the orchestrator's
//! delivery gate rather than forcibly discarded here.

use async_trait::async_trait;
use futures::stream::BoxStream;
use tokio_util::sync::CancellationToken;
use weave_core::AgentEvent;

use crate::errors::RuntimeError;

/// Event stream for one agent turn.
pub type AgentEventStream = BoxStream<'static, AgentEvent>;

/// One turn's worth of input for the agent service.
#[derive(Clone, Debug)]
pub struct AgentRequest {
    /// Fully composed prompt (user query plus any system context).
    pub prompt: String,
    /// Agent-side session id from an earlier turn of the same thread,
    /// used to continue agent-side context.
    pub resume_session_id: Option<String>,
    /// The thread's current cancellation token.
    pub cancel: CancellationToken,
}

/// External agent collaborator.
#[async_trait]
pub trait AgentService: Send + Sync {
    /// Start one turn.
    ///
    /// A well-behaved stream yields at most one terminal event and nothing
    /// after it. A cancelled turn's stream may end without a terminal event.
    /// Errors from this call mean the turn never started.
    async fn invoke(&self, request: AgentRequest) -> Result<AgentEventStream, RuntimeError>;
}
