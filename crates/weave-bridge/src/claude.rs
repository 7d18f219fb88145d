//! Claude Code CLI agent adapter.
//!
//! Implements [`AgentService`] by spawning the Claude CLI in stream-json
//! mode and mapping its stdout lines to [`AgentEvent`]s. Cancellation is
//! cooperative from the CLI's point of view: when the turn's token fires,
//! the child process is killed, which also unblocks the line reader.

use std::path::PathBuf;
use std::process::Stdio;

use async_trait::async_trait;
use serde_json::Value;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tracing::{debug, warn};
use weave_core::{AgentEvent, ToolActivity};
use weave_runtime::{AgentEventStream, AgentRequest, AgentService, RuntimeError};

/// Input fields worth surfacing as a tool-use detail line, in preference
/// order.
const DETAIL_FIELDS: &[&str] = &["command", "file_path", "pattern", "url", "query"];

/// Runs turns by spawning the Claude Code CLI.
pub struct ClaudeCliAgent {
    binary: String,
    workdir: PathBuf,
}

impl ClaudeCliAgent {
    /// Create an adapter running `binary` inside `workdir`.
    pub fn new(binary: impl Into<String>, workdir: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            workdir: workdir.into(),
        }
    }
}

#[async_trait]
impl AgentService for ClaudeCliAgent {
    async fn invoke(&self, request: AgentRequest) -> Result<AgentEventStream, RuntimeError> {
        let mut cmd = Command::new(&self.binary);
        let _ = cmd
            .arg("-p")
            .arg(&request.prompt)
            .arg("--output-format")
            .arg("stream-json")
            .arg("--verbose")
            .current_dir(&self.workdir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true);
        if let Some(session_id) = &request.resume_session_id {
            let _ = cmd.arg("--resume").arg(session_id);
        }

        let mut child = cmd.spawn().map_err(|e| {
            RuntimeError::AgentUnavailable(format!("failed to spawn {}: {e}", self.binary))
        })?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| RuntimeError::AgentUnavailable("agent stdout unavailable".into()))?;

        let cancel = request.cancel;
        let stream = async_stream::stream! {
            let mut lines = BufReader::new(stdout).lines();
            let mut running_text = String::new();
            loop {
                let batch = tokio::select! {
                    () = cancel.cancelled() => {
                        debug!("cancellation observed, killing agent process");
                        if let Err(error) = child.kill().await {
                            warn!(%error, "failed to kill agent process");
                        }
                        None
                    }
                    line = lines.next_line() => match line {
                        Ok(Some(line)) => Some(parse_stream_line(&line, &mut running_text)),
                        Ok(None) => None,
                        Err(error) => Some(vec![AgentEvent::Failed {
                            error: format!("failed reading agent output: {error}"),
                        }]),
                    }
                };
                let Some(batch) = batch else { break };
                let mut done = false;
                for event in batch {
                    done = done || event.is_terminal();
                    yield event;
                }
                if done {
                    break;
                }
            }
            let _ = child.wait().await;
        };
        Ok(Box::pin(stream))
    }
}

/// Map one stream-json line to agent events.
///
/// Unknown or malformed lines are skipped — the CLI emits more message
/// kinds than this bridge surfaces. Assistant text accumulates into
/// `running_text` so every `TextUpdate` carries the full text so far.
fn parse_stream_line(line: &str, running_text: &mut String) -> Vec<AgentEvent> {
    let Ok(value) = serde_json::from_str::<Value>(line) else {
        return Vec::new();
    };
    match value.get("type").and_then(Value::as_str) {
        Some("system") => {
            if value.get("subtype").and_then(Value::as_str) == Some("init") {
                if let Some(id) = value.get("session_id").and_then(Value::as_str) {
                    return vec![AgentEvent::SessionStarted {
                        session_id: id.to_owned(),
                    }];
                }
            }
            Vec::new()
        }
        Some("assistant") => {
            let Some(blocks) = value.pointer("/message/content").and_then(Value::as_array) else {
                return Vec::new();
            };
            let mut events = Vec::new();
            let mut tools = Vec::new();
            let mut text_appended = false;
            for block in blocks {
                match block.get("type").and_then(Value::as_str) {
                    Some("text") => {
                        if let Some(text) = block.get("text").and_then(Value::as_str) {
                            running_text.push_str(text);
                            text_appended = true;
                        }
                    }
                    Some("tool_use") => {
                        let name = block
                            .get("name")
                            .and_then(Value::as_str)
                            .unwrap_or("unknown")
                            .to_owned();
                        tools.push(AgentEvent::ToolUse {
                            activity: ToolActivity {
                                name,
                                detail: tool_detail(block.get("input")),
                            },
                        });
                    }
                    _ => {}
                }
            }
            if text_appended {
                events.push(AgentEvent::TextUpdate {
                    text: running_text.clone(),
                });
            }
            events.extend(tools);
            events
        }
        Some("result") => {
            let text = value
                .get("result")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_owned();
            let is_error = value.get("is_error").and_then(Value::as_bool).unwrap_or(false)
                || value
                    .get("subtype")
                    .and_then(Value::as_str)
                    .is_some_and(|subtype| subtype != "success");
            if is_error {
                let error = if text.is_empty() {
                    "agent returned an error".to_owned()
                } else {
                    text
                };
                vec![AgentEvent::Failed { error }]
            } else {
                vec![AgentEvent::Completed { text }]
            }
        }
        _ => Vec::new(),
    }
}

fn tool_detail(input: Option<&Value>) -> Option<String> {
    let input = input?;
    DETAIL_FIELDS
        .iter()
        .find_map(|field| input.get(field).and_then(Value::as_str))
        .map(str::to_owned)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(line: &str) -> Vec<AgentEvent> {
        let mut acc = String::new();
        parse_stream_line(line, &mut acc)
    }

    #[test]
    fn init_line_yields_session_started() {
        let events =
            parse(r#"{"type":"system","subtype":"init","session_id":"abc-123","tools":[]}"#);
        assert_eq!(
            events,
            vec![AgentEvent::SessionStarted {
                session_id: "abc-123".into()
            }]
        );
    }

    #[test]
    fn other_system_lines_are_skipped() {
        assert!(parse(r#"{"type":"system","subtype":"status"}"#).is_empty());
    }

    #[test]
    fn assistant_text_accumulates_across_lines() {
        let mut acc = String::new();
        let first = parse_stream_line(
            r#"{"type":"assistant","message":{"content":[{"type":"text","text":"Hello "}]}}"#,
            &mut acc,
        );
        let second = parse_stream_line(
            r#"{"type":"assistant","message":{"content":[{"type":"text","text":"world"}]}}"#,
            &mut acc,
        );
        assert_eq!(
            first,
            vec![AgentEvent::TextUpdate {
                text: "Hello ".into()
            }]
        );
        assert_eq!(
            second,
            vec![AgentEvent::TextUpdate {
                text: "Hello world".into()
            }]
        );
    }

    #[test]
    fn tool_use_carries_name_and_detail() {
        let events = parse(
            r#"{"type":"assistant","message":{"content":[{"type":"tool_use","name":"Bash","input":{"command":"git status"}}]}}"#,
        );
        assert_eq!(
            events,
            vec![AgentEvent::ToolUse {
                activity: ToolActivity {
                    name: "Bash".into(),
                    detail: Some("git status".into()),
                }
            }]
        );
    }

    #[test]
    fn mixed_content_yields_text_then_tools() {
        let events = parse(
            r#"{"type":"assistant","message":{"content":[{"type":"text","text":"Running tests"},{"type":"tool_use","name":"Bash","input":{"command":"cargo test"}}]}}"#,
        );
        assert_eq!(events.len(), 2);
        assert!(matches!(events[0], AgentEvent::TextUpdate { .. }));
        assert!(matches!(events[1], AgentEvent::ToolUse { .. }));
    }

    #[test]
    fn success_result_completes() {
        let events =
            parse(r#"{"type":"result","subtype":"success","result":"All fixed.","is_error":false}"#);
        assert_eq!(
            events,
            vec![AgentEvent::Completed {
                text: "All fixed.".into()
            }]
        );
    }

    #[test]
    fn error_result_fails() {
        let events = parse(
            r#"{"type":"result","subtype":"error_during_execution","result":"","is_error":true}"#,
        );
        assert_eq!(
            events,
            vec![AgentEvent::Failed {
                error: "agent returned an error".into()
            }]
        );
    }

    #[test]
    fn garbage_lines_are_skipped() {
        assert!(parse("not json at all").is_empty());
        assert!(parse(r#"{"type":"user"}"#).is_empty());
    }
}
