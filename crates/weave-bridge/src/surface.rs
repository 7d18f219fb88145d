//! Console surface — a local, line-oriented stand-in for a chat platform.
//!
//! Each stdin line becomes a turn on one fixed thread; `/stop` cancels the
//! in-flight turn. A real platform binding would supply its own
//! [`TurnSink`] and inbound event wiring through the same seams.

use std::io;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::error;
use weave_core::{SurfaceId, ThreadKey, ToolActivity, TurnSummary};
use weave_runtime::{Orchestrator, TurnSink};

use crate::prompts::build_prompt;

/// Prints turn updates to stdout.
pub struct ConsoleSink;

#[async_trait]
impl TurnSink for ConsoleSink {
    async fn on_progress(
        &self,
        text: &str,
        tool: Option<&ToolActivity>,
        elapsed_seconds: u64,
        tool_call_count: u32,
    ) {
        if let Some(tool) = tool {
            match &tool.detail {
                Some(detail) => {
                    println!("… {elapsed_seconds}s [{tool_call_count} tools] {} {detail}", tool.name);
                }
                None => println!("… {elapsed_seconds}s [{tool_call_count} tools] {}", tool.name),
            }
        } else if let Some(line) = text.lines().last() {
            println!("… {elapsed_seconds}s [{tool_call_count} tools] {line}");
        }
    }

    async fn on_result(&self, text: &str, summary: TurnSummary) {
        println!(
            "{text}\n— done in {}s, {} tool calls",
            summary.duration_seconds, summary.tool_call_count
        );
    }

    async fn on_error(&self, message: &str) {
        println!("error: {message}");
    }
}

/// Run the console loop until stdin closes or `/quit`.
pub async fn run_console(
    orchestrator: Arc<Orchestrator>,
    surface: SurfaceId,
    thread: ThreadKey,
) -> io::Result<()> {
    println!("weave console — type a message; /stop cancels, /quit exits");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match line {
            "/quit" => break,
            "/stop" => {
                let abort = orchestrator.abort_turn(&surface, &thread);
                if abort.cancelled && abort.handler.is_some() {
                    println!("stopped.");
                } else {
                    println!("nothing to stop.");
                }
            }
            query => {
                let prompt = build_prompt(query);
                let orchestrator = Arc::clone(&orchestrator);
                let surface = surface.clone();
                let thread = thread.clone();
                // Run in the background so /stop can be typed mid-turn.
                let _ = tokio::spawn(async move {
                    let sink: Arc<dyn TurnSink> = Arc::new(ConsoleSink);
                    if let Err(error) = orchestrator
                        .run_turn(&surface, &thread, &prompt, sink)
                        .await
                    {
                        error!(%error, "turn failed to start");
                    }
                });
            }
        }
    }
    Ok(())
}
