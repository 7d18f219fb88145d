//! # weave-core
//!
//! Foundation types for the weave agent bridge.
//!
//! This crate provides the shared vocabulary the runtime and bridge crates
//! depend on:
//!
//! - **Branded IDs**: [`ids::ThreadKey`], [`ids::SurfaceId`], [`ids::TurnKey`]
//!   as newtypes
//! - **Events**: [`events::AgentEvent`] for the incremental agent stream,
//!   [`events::TurnSummary`] for terminal results
//!
//! ## Crate Position
//!
//! Foundation crate. Depended on by `weave-runtime` and `weave-bridge`.

#![deny(unsafe_code)]

pub mod events;
pub mod ids;

pub use events::{AgentEvent, ToolActivity, TurnSummary};
pub use ids::{SurfaceId, ThreadKey, TurnKey};
