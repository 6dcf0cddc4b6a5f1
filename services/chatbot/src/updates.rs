//! Fan-out of live chat updates to dashboard sockets

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::{debug, warn};

/// Frames buffered per subscriber before it starts skipping
pub const DEFAULT_CAPACITY: usize = 256;

/// Broadcast hub; clones publish to the same subscribers
#[derive(Debug, Clone)]
pub struct UpdateHub {
    sender: broadcast::Sender<String>,
    next_id: Arc<AtomicUsize>,
}

impl Default for UpdateHub {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl UpdateHub {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender,
            next_id: Arc::new(AtomicUsize::new(1)),
        }
    }

    /// Register a new client
    pub fn subscribe(&self) -> UpdateSubscription {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        debug!("Update client {} connected", id);
        UpdateSubscription {
            id,
            receiver: self.sender.subscribe(),
        }
    }

    /// Send `message` to every connected client, returning how many were reached
    pub fn publish(&self, message: impl Into<String>) -> usize {
        self.sender.send(message.into()).unwrap_or(0)
    }

    pub fn client_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

/// One connected client; dropping it disconnects
#[derive(Debug)]
pub struct UpdateSubscription {
    pub id: usize,
    receiver: broadcast::Receiver<String>,
}

impl UpdateSubscription {
    /// Next frame, or `None` once the hub is gone
    ///
    /// A client that falls behind skips the frames it missed.
    pub async fn recv(&mut self) -> Option<String> {
        loop {
            match self.receiver.recv().await {
                Ok(message) => return Some(message),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!("Update client {} lagged, skipped {} frames", self.id, skipped);
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}

impl Drop for UpdateSubscription {
    fn drop(&mut self) {
        debug!("Update client {} disconnected", self.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn publish_without_clients_reaches_nobody() {
        let hub = UpdateHub::default();
        assert_eq!(hub.publish("hello"), 0);
        assert_eq!(hub.client_count(), 0);
    }

    #[tokio::test]
    async fn every_client_receives_each_frame() {
        let hub = UpdateHub::default();
        let mut first = hub.subscribe();
        let mut second = hub.subscribe();
        assert_ne!(first.id, second.id);
        assert_eq!(hub.client_count(), 2);

        assert_eq!(hub.publish("one"), 2);
        assert_eq!(hub.publish("two"), 2);

        assert_eq!(first.recv().await.as_deref(), Some("one"));
        assert_eq!(first.recv().await.as_deref(), Some("two"));
        assert_eq!(second.recv().await.as_deref(), Some("one"));
        assert_eq!(second.recv().await.as_deref(), Some("two"));
    }

    #[tokio::test]
    async fn dropping_a_subscription_disconnects_it() {
        let hub = UpdateHub::default();
        let subscription = hub.subscribe();
        assert_eq!(hub.client_count(), 1);

        drop(subscription);
        assert_eq!(hub.client_count(), 0);
    }

    #[tokio::test]
    async fn lagging_client_skips_to_newest_frames() {
        let hub = UpdateHub::new(2);
        let mut slow = hub.subscribe();

        for i in 0..5 {
            hub.publish(format!("frame {}", i));
        }

        assert_eq!(slow.recv().await.as_deref(), Some("frame 3"));
        assert_eq!(slow.recv().await.as_deref(), Some("frame 4"));
    }

    #[tokio::test]
    async fn recv_ends_when_hub_is_dropped() {
        let hub = UpdateHub::default();
        let mut subscription = hub.subscribe();
        drop(hub);

        assert_eq!(subscription.recv().await, None);
    }
}
