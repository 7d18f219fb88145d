//! Janitor — periodic eviction of idle sessions.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::registry::SessionRegistry;

/// Spawn the periodic idle-session sweep.
///
/// Every `period`, sessions idle longer than `max_idle` are deleted, which
/// fires their cancellation tokens. A session with a live turn only has its
/// token fired here — unregistering the turn's handler stays the
/// orchestrator's job once it observes the cancellation. The task exits
/// when `shutdown` fires.
pub fn spawn_janitor(
    registry: Arc<SessionRegistry>,
    period: Duration,
    max_idle: Duration,
    shutdown: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                () = shutdown.cancelled() => {
                    debug!("janitor shutting down");
                    break;
                }
                _ = ticker.tick() => {
                    let evicted = registry.sweep_idle(max_idle);
                    if evicted > 0 {
                        info!(evicted, remaining = registry.len(), "evicted idle sessions");
                    }
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use weave_core::ThreadKey;

    #[tokio::test(start_paused = true)]
    async fn janitor_sweeps_on_period() {
        let registry = Arc::new(SessionRegistry::new());
        let _ = registry.get_or_create(&ThreadKey::new("t1"));

        let shutdown = CancellationToken::new();
        let handle = spawn_janitor(
            Arc::clone(&registry),
            Duration::from_secs(60),
            // Zero idle threshold: everything not touched in the same
            // instant as the sweep is evicted.
            Duration::from_secs(0),
            shutdown.clone(),
        );

        // Let the first tick and one full period elapse.
        tokio::time::advance(Duration::from_secs(61)).await;
        for _ in 0..4 {
            tokio::task::yield_now().await;
        }

        assert!(!registry.exists(&ThreadKey::new("t1")));

        shutdown.cancel();
        handle.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn janitor_stops_on_shutdown() {
        let registry = Arc::new(SessionRegistry::new());
        let shutdown = CancellationToken::new();
        let handle = spawn_janitor(
            Arc::clone(&registry),
            Duration::from_secs(60),
            Duration::from_secs(3600),
            shutdown.clone(),
        );

        shutdown.cancel();
        handle.await.unwrap();

        // Sessions created after shutdown are never swept.
        let _ = registry.get_or_create(&ThreadKey::new("t1"));
        tokio::time::advance(Duration::from_secs(7200)).await;
        tokio::task::yield_now().await;
        assert!(registry.exists(&ThreadKey::new("t1")));
    }
}
