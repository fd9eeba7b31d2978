//! Bookkeeping for the subscriber tasks the dispatcher spawns.
//!
//! Each internal subscription (lifecycle publisher, log echo) holds an
//! [`InflightGuard`] until its invocation resolved and everything was
//! published. Owners use [`InflightTracker::wait_idle`] to wait for all of them.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::Notify;

#[derive(Default)]
struct Inner {
    count: AtomicUsize,
    idle: Notify,
}

/// Counts live internal subscriptions.
#[derive(Clone, Default)]
pub struct InflightTracker {
    inner: Arc<Inner>,
}

impl InflightTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers one subscription; it stays counted until the guard drops.
    pub fn enter(&self) -> InflightGuard {
        self.inner.count.fetch_add(1, Ordering::AcqRel);
        InflightGuard {
            inner: Arc::clone(&self.inner),
        }
    }

    pub fn in_flight(&self) -> usize {
        self.inner.count.load(Ordering::Acquire)
    }

    /// Resolves once no subscription is live.
    pub async fn wait_idle(&self) {
        loop {
            let notified = self.inner.idle.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            if self.in_flight() == 0 {
                return;
            }
            notified.await;
        }
    }
}

impl std::fmt::Debug for InflightTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InflightTracker")
            .field("in_flight", &self.in_flight())
            .finish()
    }
}

/// Keeps one subscription counted while alive.
#[must_use = "the subscription is only tracked while the guard is alive"]
pub struct InflightGuard {
    inner: Arc<Inner>,
}

impl Drop for InflightGuard {
    fn drop(&mut self) {
        if self.inner.count.fetch_sub(1, Ordering::AcqRel) == 1 {
            self.inner.idle.notify_waiters();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn idle_tracker_resolves_immediately() {
        let tracker = InflightTracker::new();
        tracker.wait_idle().await;
        assert_eq!(tracker.in_flight(), 0);
    }

    #[tokio::test]
    async fn waits_for_every_guard() {
        let tracker = InflightTracker::new();
        let first = tracker.enter();
        let second = tracker.enter();
        assert_eq!(tracker.in_flight(), 2);

        let waiter = tokio::spawn({
            let tracker = tracker.clone();
            async move { tracker.wait_idle().await }
        });

        drop(first);
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(!waiter.is_finished());

        drop(second);
        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .expect("wait_idle should resolve")
            .unwrap();
        assert_eq!(tracker.in_flight(), 0);
    }
}
