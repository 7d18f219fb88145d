//! weave — bridge a conversation thread to the Claude Code CLI.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use weave_bridge::{app_info, surface::run_console, BridgeConfig, ClaudeCliAgent};
use weave_core::{SurfaceId, ThreadKey};
use weave_runtime::{spawn_janitor, AgentService, Orchestrator, SessionRegistry};

#[derive(Parser)]
#[command(name = "weave", version, about = "Thread-scoped bridge to the Claude Code CLI")]
struct Args {
    /// Surface label for the local console session.
    #[arg(long, default_value = "console")]
    surface: String,

    /// Thread label for the local console session.
    #[arg(long, default_value = "local")]
    thread: String,

    /// Working directory the agent runs in (overrides WEAVE_AGENT_CWD).
    #[arg(long)]
    agent_cwd: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let config = BridgeConfig::load(args.agent_cwd).context("configuration")?;

    info!(version = app_info::version(), "starting weave");
    match app_info::capture_commit_hash(&config.agent_cwd) {
        Some(commit) => info!(commit, "captured startup commit"),
        None => warn!("could not capture startup commit hash"),
    }

    let registry = Arc::new(SessionRegistry::new());
    let agent: Arc<dyn AgentService> = Arc::new(ClaudeCliAgent::new(
        config.claude_bin.clone(),
        config.agent_cwd.clone(),
    ));
    let orchestrator = Arc::new(Orchestrator::new(Arc::clone(&registry), agent));

    let shutdown = CancellationToken::new();
    let janitor = spawn_janitor(
        Arc::clone(&registry),
        config.janitor_period,
        config.session_max_idle,
        shutdown.clone(),
    );

    let surface = SurfaceId::new(args.surface);
    let thread = ThreadKey::new(args.thread);
    tokio::select! {
        result = run_console(Arc::clone(&orchestrator), surface, thread) => {
            result.context("console loop")?;
        }
        _ = tokio::signal::ctrl_c() => {
            info!("interrupt received, shutting down");
        }
    }

    shutdown.cancel();
    janitor.await.context("janitor shutdown")?;
    Ok(())
}
