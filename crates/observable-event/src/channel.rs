//! Broadcast channel for lifecycle notifications.
//!
//! [`Channel`] fans every published value out to one unbounded
//! [`tokio::sync::mpsc`] queue per subscriber.
//!
//! ## Rules
//! - **Non-blocking publish**: `publish()` never waits for receivers.
//! - **No replay**: a receiver only sees values sent after it subscribed.
//! - **No loss**: a receiver gets every value sent while it is alive, however
//!   far behind it reads. Unread values stay queued for that receiver only.
//! - **Ordered**: publishes are serialized, so every receiver sees the same order.
//! - **Shared**: clones publish to and subscribe from the same stream.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::mpsc;

/// Receiving half handed out by [`Channel::subscribe`].
pub type Receiver<T> = mpsc::UnboundedReceiver<T>;

type Subscribers<T> = Mutex<Vec<mpsc::UnboundedSender<T>>>;

/// Many-publisher, many-subscriber stream of one notification shape.
pub struct Channel<T> {
    subscribers: Arc<Subscribers<T>>,
}

impl<T: Clone> Channel<T> {
    pub fn new() -> Self {
        Self {
            subscribers: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Sends a value to every current receiver.
    ///
    /// Returns how many receivers it was delivered to. Receivers that were
    /// dropped are forgotten here. With no receivers the value is dropped.
    pub fn publish(&self, value: T) -> usize {
        let mut subscribers = self.lock();
        subscribers.retain(|tx| tx.send(value.clone()).is_ok());
        subscribers.len()
    }

    /// Creates an independent receiver for subsequent values.
    pub fn subscribe(&self) -> Receiver<T> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.lock().push(tx);
        rx
    }

    /// Number of receivers still alive.
    pub fn receiver_count(&self) -> usize {
        self.lock().iter().filter(|tx| !tx.is_closed()).count()
    }

    /// Returns true if both handles refer to the same underlying channel.
    pub fn same_channel(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.subscribers, &other.subscribers)
    }

    // Poisoning is ignored: no operation leaves the list half-updated.
    fn lock(&self) -> MutexGuard<'_, Vec<mpsc::UnboundedSender<T>>> {
        self.subscribers.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T: Clone> Default for Channel<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for Channel<T> {
    fn clone(&self) -> Self {
        Self {
            subscribers: Arc::clone(&self.subscribers),
        }
    }
}

impl<T: Clone> fmt::Debug for Channel<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Channel")
            .field("receivers", &self.receiver_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc::error::TryRecvError;

    #[tokio::test]
    async fn late_receiver_does_not_see_earlier_values() {
        let channel = Channel::new();
        let mut early = channel.subscribe();

        assert_eq!(channel.publish(1), 1);
        let mut late = channel.subscribe();
        channel.publish(2);

        assert_eq!(early.recv().await.unwrap(), 1);
        assert_eq!(early.recv().await.unwrap(), 2);
        assert_eq!(late.recv().await.unwrap(), 2);
        assert!(matches!(late.try_recv(), Err(TryRecvError::Empty)));
    }

    #[test]
    fn slow_receiver_keeps_every_value() {
        let channel = Channel::new();
        let mut rx = channel.subscribe();

        for i in 0..10_000 {
            channel.publish(i);
        }

        let received: Vec<i32> = std::iter::from_fn(|| rx.try_recv().ok()).collect();
        assert_eq!(received, (0..10_000).collect::<Vec<_>>());
    }

    #[test]
    fn dropped_receivers_are_forgotten() {
        let channel = Channel::new();
        let kept = channel.subscribe();
        drop(channel.subscribe());

        assert_eq!(channel.publish("hello"), 1);
        assert_eq!(channel.receiver_count(), 1);
        drop(kept);
        assert_eq!(channel.publish("lost"), 0);
        assert_eq!(channel.receiver_count(), 0);
    }

    #[test]
    fn clones_share_the_stream() {
        let a: Channel<u8> = Channel::new();
        let b = a.clone();
        let c: Channel<u8> = Channel::new();

        let mut rx = b.subscribe();
        a.publish(3);

        assert_eq!(rx.try_recv().unwrap(), 3);
        assert!(a.same_channel(&b));
        assert!(!a.same_channel(&c));
    }
}
