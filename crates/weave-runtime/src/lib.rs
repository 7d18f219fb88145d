//! # weave-runtime
//!
//! Thread-scoped session and cancellation coordination for the weave bridge.
//!
//! One conversation thread maps to exactly one [`Session`] holding the
//! agent-side continuity handle and the thread's current cancellation token.
//! At most one turn per `(surface, thread)` is live at a time; the
//! [`Orchestrator`] drives a turn end-to-end and gates every callback
//! delivery on the turn still being registered, so a cancel request turns
//! into "no further updates" without interrupting work already in flight.
//!
//! - **Session registry**: per-thread session state, cancellation coordination
//! - **Turn tracker**: in-flight handler registry, the liveness authority
//! - **Orchestrator**: one agent turn end-to-end, delivery gating
//! - **Janitor**: periodic eviction of idle sessions
//!
//! ## Crate Position
//!
//! Core layer. Depends on: weave-core. Depended on by: weave-bridge.

#![deny(unsafe_code)]

pub mod agent;
pub mod errors;
pub mod janitor;
pub mod orchestrator;
pub mod registry;
pub mod sink;
pub mod tracker;

pub use agent::{AgentEventStream, AgentRequest, AgentService};
pub use errors::RuntimeError;
pub use janitor::spawn_janitor;
pub use orchestrator::{AbortOutcome, Orchestrator, TurnOutcome};
pub use registry::{Session, SessionRegistry};
pub use sink::TurnSink;
pub use tracker::TurnTracker;
