//! Turn tracker — the in-flight handler registry.
//!
//! The presence of an entry is the sole authority for "is this turn still
//! live". Every delivery path re-checks presence immediately before
//! invoking a handler; once an entry is gone, late events are dropped
//! rather than delivered. This gate is what turns a cancel request into
//! "no further updates" without interrupting a callback already in flight.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::warn;
use weave_core::TurnKey;

use crate::sink::TurnSink;

/// Tracks the single in-flight handler per `(surface, thread)`.
pub struct TurnTracker {
    active: HashMap<TurnKey, Arc<dyn TurnSink>>,
}

impl TurnTracker {
    /// Create an empty tracker.
    pub fn new() -> Self {
        Self {
            active: HashMap::new(),
        }
    }

    /// Store the handler for a turn, replacing any previous entry.
    ///
    /// There should never be two concurrent turns for one key; overwriting
    /// (rather than keeping both) self-heals if one occurs.
    pub fn register(&mut self, key: TurnKey, sink: Arc<dyn TurnSink>) {
        if self.active.insert(key.clone(), sink).is_some() {
            warn!(%key, "replaced in-flight turn handler");
        }
    }

    /// The handler for a turn, if it is still live.
    pub fn get(&self, key: &TurnKey) -> Option<Arc<dyn TurnSink>> {
        self.active.get(key).map(Arc::clone)
    }

    /// Remove and return the handler for a turn. Idempotent.
    pub fn unregister(&mut self, key: &TurnKey) -> Option<Arc<dyn TurnSink>> {
        self.active.remove(key)
    }

    /// Whether a turn is still live.
    pub fn contains(&self, key: &TurnKey) -> bool {
        self.active.contains_key(key)
    }

    /// Number of live turns.
    pub fn len(&self) -> usize {
        self.active.len()
    }

    /// Whether no turns are live.
    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }
}

impl Default for TurnTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use weave_core::{ToolActivity, TurnSummary};

    struct NullSink;

    #[async_trait]
    impl TurnSink for NullSink {
        async fn on_progress(&self, _: &str, _: Option<&ToolActivity>, _: u64, _: u32) {}
        async fn on_result(&self, _: &str, _: TurnSummary) {}
        async fn on_error(&self, _: &str) {}
    }

    fn key(surface: &str, thread: &str) -> TurnKey {
        TurnKey::new(surface, thread)
    }

    #[test]
    fn new_is_empty() {
        let tracker = TurnTracker::new();
        assert!(tracker.is_empty());
        assert_eq!(tracker.len(), 0);
    }

    #[test]
    fn register_then_get() {
        let mut tracker = TurnTracker::new();
        tracker.register(key("C1", "t1"), Arc::new(NullSink));

        assert!(tracker.contains(&key("C1", "t1")));
        assert!(tracker.get(&key("C1", "t1")).is_some());
        assert_eq!(tracker.len(), 1);
    }

    #[test]
    fn get_unknown_is_none() {
        let tracker = TurnTracker::new();
        assert!(tracker.get(&key("C1", "t1")).is_none());
    }

    #[test]
    fn same_thread_different_surface_is_distinct() {
        let mut tracker = TurnTracker::new();
        tracker.register(key("C1", "t1"), Arc::new(NullSink));
        tracker.register(key("C2", "t1"), Arc::new(NullSink));
        assert_eq!(tracker.len(), 2);
    }

    #[test]
    fn register_overwrites_existing_entry() {
        let mut tracker = TurnTracker::new();
        let first: Arc<dyn TurnSink> = Arc::new(NullSink);
        let second: Arc<dyn TurnSink> = Arc::new(NullSink);

        tracker.register(key("C1", "t1"), Arc::clone(&first));
        tracker.register(key("C1", "t1"), Arc::clone(&second));

        assert_eq!(tracker.len(), 1);
        let current = tracker.get(&key("C1", "t1")).unwrap();
        assert!(Arc::ptr_eq(&current, &second));
    }

    #[test]
    fn unregister_removes_and_returns() {
        let mut tracker = TurnTracker::new();
        tracker.register(key("C1", "t1"), Arc::new(NullSink));

        assert!(tracker.unregister(&key("C1", "t1")).is_some());
        assert!(!tracker.contains(&key("C1", "t1")));

        // Idempotent: already absent is fine.
        assert!(tracker.unregister(&key("C1", "t1")).is_none());
    }
}
