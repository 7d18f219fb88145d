//! Delivery callbacks for one turn.

use async_trait::async_trait;
use weave_core::{ToolActivity, TurnSummary};

/// Receives a turn's progress and terminal callbacks.
///
/// Supplied by the chat-platform adapter; one sink per turn. The
/// orchestrator guarantees emission-order delivery and that `on_result` /
/// `on_error` is the last call a sink ever receives for its turn. A sink
/// whose turn was cancelled simply stops hearing anything.
#[async_trait]
pub trait TurnSink: Send + Sync {
    /// Incremental progress: running text, the tool that just ran (if any),
    /// elapsed wall-clock seconds, and the running tool-invocation count.
    async fn on_progress(
        &self,
        text: &str,
        tool: Option<&ToolActivity>,
        elapsed_seconds: u64,
        tool_call_count: u32,
    );

    /// Terminal success with the final text and a turn summary.
    async fn on_result(&self, text: &str, summary: TurnSummary);

    /// Terminal failure. Delivered at most once, never retried.
    async fn on_error(&self, message: &str);
}
