//! # weave-bridge
//!
//! Chat-side glue around `weave-runtime`: configuration, prompt
//! composition, startup build info, the Claude Code CLI agent adapter, and
//! a local console surface. Everything here is direct, sequential plumbing;
//! the concurrency and lifecycle invariants live in `weave-runtime`.

#![deny(unsafe_code)]

pub mod app_info;
pub mod claude;
pub mod config;
pub mod prompts;
pub mod surface;

pub use claude::ClaudeCliAgent;
pub use config::{BridgeConfig, ConfigError};
