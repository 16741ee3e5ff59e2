//! Session reaper
//!
//! The session store enforces no TTL of its own; this background task is
//! the external reaper that evicts idle sessions.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;

use concierge_agent::SessionStore;

/// Start a background task that periodically evicts expired sessions.
///
/// Returns a shutdown sender that can be used to stop the task. The task
/// runs every `interval` and removes sessions idle for longer than
/// `timeout`.
pub fn start_cleanup_task(
    store: Arc<SessionStore>,
    timeout: Duration,
    interval: Duration,
) -> watch::Sender<bool> {
    let (shutdown_tx, mut shutdown_rx) = watch::channel(false);

    tokio::spawn(async move {
        let mut interval_timer = tokio::time::interval(interval);
        interval_timer.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = interval_timer.tick() => {
                    let removed = store.cleanup_expired(timeout);
                    if removed > 0 {
                        tracing::info!(
                            removed,
                            remaining = store.count(),
                            "evicted expired sessions"
                        );
                    }
                }
                _ = shutdown_rx.changed() => {
                    if *shutdown_rx.borrow() {
                        tracing::info!("session cleanup task shutting down");
                        break;
                    }
                }
            }
        }
    });

    shutdown_tx
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_reaper_evicts_idle_sessions() {
        let store = Arc::new(SessionStore::new());
        store.create("stale", true);

        let shutdown = start_cleanup_task(
            store.clone(),
            Duration::ZERO,
            Duration::from_millis(10),
        );

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(store.count(), 0);

        shutdown.send(true).expect("reaper still running");
    }
}
