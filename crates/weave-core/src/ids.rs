//! Branded identifier newtypes.
//!
//! A conversation thread is identified by an opaque [`ThreadKey`] (the chat
//! platform's thread timestamp or equivalent) and lives on a [`SurfaceId`]
//! (channel, DM, etc.). A [`TurnKey`] pairs the two and keys the in-flight
//! turn tracker.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Stable identifier correlating all messages of one conversation thread.
///
/// Created once per thread by the chat platform and never changes.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ThreadKey(String);

impl ThreadKey {
    /// Create a thread key from a raw platform identifier.
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// The raw identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ThreadKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ThreadKey {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl From<String> for ThreadKey {
    fn from(raw: String) -> Self {
        Self(raw)
    }
}

/// Identifier of the conversation surface a thread lives on (channel, DM).
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SurfaceId(String);

impl SurfaceId {
    /// Create a surface id from a raw platform identifier.
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// The raw identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SurfaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SurfaceId {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl From<String> for SurfaceId {
    fn from(raw: String) -> Self {
        Self(raw)
    }
}

/// Key identifying one in-flight turn: `(surface, thread)`.
///
/// Renders as `surface:thread`, the wire form used in logs.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TurnKey {
    /// Conversation surface the turn was started on.
    pub surface: SurfaceId,
    /// Thread the turn belongs to.
    pub thread: ThreadKey,
}

impl TurnKey {
    /// Create a turn key.
    pub fn new(surface: impl Into<SurfaceId>, thread: impl Into<ThreadKey>) -> Self {
        Self {
            surface: surface.into(),
            thread: thread.into(),
        }
    }
}

impl fmt::Display for TurnKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.surface, self.thread)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thread_key_round_trips() {
        let key = ThreadKey::new("1726000000.000100");
        assert_eq!(key.as_str(), "1726000000.000100");
        assert_eq!(key.to_string(), "1726000000.000100");
    }

    #[test]
    fn thread_key_equality_by_value() {
        assert_eq!(ThreadKey::from("t1"), ThreadKey::new(String::from("t1")));
        assert_ne!(ThreadKey::from("t1"), ThreadKey::from("t2"));
    }

    #[test]
    fn turn_key_display_is_surface_colon_thread() {
        let key = TurnKey::new("C042", "1726000000.000100");
        assert_eq!(key.to_string(), "C042:1726000000.000100");
    }

    #[test]
    fn turn_key_hashes_by_both_parts() {
        use std::collections::HashSet;
        let mut set = HashSet::new();
        assert!(set.insert(TurnKey::new("C1", "t1")));
        assert!(set.insert(TurnKey::new("C2", "t1")));
        assert!(set.insert(TurnKey::new("C1", "t2")));
        assert!(!set.insert(TurnKey::new("C1", "t1")));
    }

    #[test]
    fn serde_transparent() {
        let key = ThreadKey::new("t1");
        assert_eq!(serde_json::to_string(&key).unwrap(), "\"t1\"");
        let back: ThreadKey = serde_json::from_str("\"t1\"").unwrap();
        assert_eq!(back, key);
    }
}
