//! Session registry — per-thread session state and cancellation coordination.
//!
//! One [`Session`] per thread key, created lazily on the first message and
//! shared as an `Arc` so concurrent turns on the same thread observe the
//! same state (and the same cancellation token lineage). All registry
//! operations are brief, non-suspending map accesses; no lock is ever held
//! across an await point.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use metrics::gauge;
use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument};
use weave_core::ThreadKey;

/// One conversation thread's ongoing relationship with the agent.
pub struct Session {
    created_at: DateTime<Utc>,
    last_activity: Mutex<DateTime<Utc>>,
    agent_session_id: Mutex<Option<String>>,
    /// The thread's current cancellation token. Exactly one token is
    /// "current" at any time; a fired token is replaced with a fresh one
    /// when the next turn starts, so a new turn is never born cancelled.
    cancel: Mutex<CancellationToken>,
}

impl Session {
    fn new(now: DateTime<Utc>) -> Self {
        Self {
            created_at: now,
            last_activity: Mutex::new(now),
            agent_session_id: Mutex::new(None),
            cancel: Mutex::new(CancellationToken::new()),
        }
    }

    /// When the session was created.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// When the session was last touched (creation or reuse).
    pub fn last_activity(&self) -> DateTime<Utc> {
        *self.last_activity.lock()
    }

    /// The agent-side session handle, once the agent has assigned one.
    pub fn agent_session_id(&self) -> Option<String> {
        self.agent_session_id.lock().clone()
    }

    /// A clone of the thread's current cancellation token.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.lock().clone()
    }

    fn touch(&self, now: DateTime<Utc>) {
        *self.last_activity.lock() = now;
    }

    fn set_agent_session_id(&self, id: &str) {
        *self.agent_session_id.lock() = Some(id.to_owned());
    }

    /// Replace a fired token with a fresh one. Called at turn start so the
    /// new turn observes an un-fired token; holders of the old token keep
    /// seeing the cancellation they already observed.
    fn refresh_token_if_fired(&self) {
        let mut token = self.cancel.lock();
        if token.is_cancelled() {
            *token = CancellationToken::new();
        }
    }

    /// Fire the current token. Returns `false` if it had already fired.
    fn fire(&self) -> bool {
        let token = self.cancel.lock();
        if token.is_cancelled() {
            false
        } else {
            token.cancel();
            true
        }
    }
}

/// Mapping from thread key to session state.
///
/// Explicitly constructed and passed around as an `Arc`; never a
/// module-level singleton. All operations are total — absence is a silent
/// no-op, never an error.
pub struct SessionRegistry {
    sessions: Mutex<HashMap<ThreadKey, Arc<Session>>>,
}

impl SessionRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
        }
    }

    /// Get the session for a thread, creating it on first use.
    ///
    /// Touches `last_activity` on every call. If the session's current
    /// token has already fired (a cancel happened since the last turn),
    /// a fresh token is installed before returning.
    pub fn get_or_create(&self, thread: &ThreadKey) -> Arc<Session> {
        let now = Utc::now();
        let session = {
            let mut sessions = self.sessions.lock();
            let session = Arc::clone(sessions.entry(thread.clone()).or_insert_with(|| {
                debug!(%thread, "session created");
                Arc::new(Session::new(now))
            }));
            gauge!("weave_sessions_active").set(sessions.len() as f64);
            session
        };
        session.touch(now);
        session.refresh_token_if_fired();
        session
    }

    /// Record the agent-side session id for a thread.
    ///
    /// Best-effort annotation: silently a no-op when no session exists.
    pub fn update_agent_session_id(&self, thread: &ThreadKey, id: &str) {
        if let Some(session) = self.get(thread) {
            session.set_agent_session_id(id);
        }
    }

    /// Cancel the thread's current turn by firing its token.
    ///
    /// Returns `true` only if a session exists and its current token had
    /// not already fired. Repeat calls before the next turn starts return
    /// `false` — cancellation is idempotent by design.
    #[instrument(skip(self), fields(thread = %thread))]
    pub fn abort(&self, thread: &ThreadKey) -> bool {
        let Some(session) = self.get(thread) else {
            return false;
        };
        let fired = session.fire();
        if fired {
            info!(%thread, "cancellation fired");
        }
        fired
    }

    /// Remove a thread's session, firing its current token to unblock any
    /// waiter. Idempotent; a hard reset — the agent session id does not
    /// survive.
    pub fn delete(&self, thread: &ThreadKey) {
        let removed = {
            let mut sessions = self.sessions.lock();
            let removed = sessions.remove(thread);
            gauge!("weave_sessions_active").set(sessions.len() as f64);
            removed
        };
        if let Some(session) = removed {
            let _ = session.fire();
            debug!(%thread, "session deleted");
        }
    }

    /// Whether a session exists for the thread.
    pub fn exists(&self, thread: &ThreadKey) -> bool {
        self.sessions.lock().contains_key(thread)
    }

    /// The thread's current cancellation token, if a session exists.
    pub fn cancellation_token(&self, thread: &ThreadKey) -> Option<CancellationToken> {
        self.get(thread).map(|s| s.cancellation_token())
    }

    /// Number of live sessions.
    pub fn len(&self) -> usize {
        self.sessions.lock().len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.sessions.lock().is_empty()
    }

    /// Evict all sessions idle longer than `max_idle`, measured from now.
    /// Returns the number of sessions evicted.
    pub fn sweep_idle(&self, max_idle: Duration) -> usize {
        self.sweep_idle_at(Utc::now(), max_idle)
    }

    /// Evict sessions whose `last_activity` is older than `now - max_idle`.
    ///
    /// Taking `now` explicitly keeps sweeps deterministic for callers that
    /// need them to be (tests, batch maintenance).
    pub fn sweep_idle_at(&self, now: DateTime<Utc>, max_idle: Duration) -> usize {
        let idle = chrono::Duration::from_std(max_idle).unwrap_or(chrono::Duration::MAX);
        let Some(cutoff) = now.checked_sub_signed(idle) else {
            return 0;
        };
        let expired: Vec<ThreadKey> = {
            let sessions = self.sessions.lock();
            sessions
                .iter()
                .filter(|(_, session)| session.last_activity() < cutoff)
                .map(|(thread, _)| thread.clone())
                .collect()
        };
        for thread in &expired {
            self.delete(thread);
        }
        expired.len()
    }

    fn get(&self, thread: &ThreadKey) -> Option<Arc<Session>> {
        self.sessions.lock().get(thread).map(Arc::clone)
    }
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
