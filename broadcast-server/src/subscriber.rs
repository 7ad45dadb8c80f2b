//! The subscriber contract and an in-process implementation.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::error::DeliveryError;

/// Identity assigned to a subscriber when it joins a hub.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriberId(u64);

impl SubscriberId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for SubscriberId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "sub-{}", self.0)
    }
}

/// A connected consumer of the event stream.
///
/// The hub calls `send` from a dedicated delivery task, one message at a time
/// and in publish order, so an implementation may suspend for as long as its
/// transport needs without holding up other subscribers.
#[async_trait]
pub trait Subscriber: Send + Sync + 'static {
    /// Deliver one serialized event. An error evicts the subscriber.
    async fn send(&self, message: Arc<str>) -> Result<(), DeliveryError>;

    /// Whether the peer is known to be gone.
    fn is_closed(&self) -> bool;

    /// Resolves once the peer is gone.
    async fn closed(&self);

    /// Called by the hub when the subscriber is removed. Must not block.
    fn close(&self) {}
}

/// A subscriber that forwards messages into a bounded tokio channel.
///
/// Useful for consuming the event stream in-process. Dropping the receiver
/// disconnects the subscriber.
pub struct ChannelSubscriber {
    sender: mpsc::Sender<Arc<str>>,
}

impl ChannelSubscriber {
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<Arc<str>>) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        (Self { sender }, receiver)
    }
}

#[async_trait]
impl Subscriber for ChannelSubscriber {
    async fn send(&self, message: Arc<str>) -> Result<(), DeliveryError> {
        self.sender
            .send(message)
            .await
            .map_err(|_| DeliveryError::Disconnected)
    }

    fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }

    async fn closed(&self) {
        self.sender.closed().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subscriber_id_display() {
        assert_eq!(SubscriberId::new(7).to_string(), "sub-7");
        assert_eq!(SubscriberId::new(7).as_u64(), 7);
    }

    #[tokio::test]
    async fn test_channel_subscriber_delivers() {
        let (subscriber, mut rx) = ChannelSubscriber::new(4);
        subscriber.send(Arc::from("hello")).await.unwrap();
        assert_eq!(rx.recv().await.as_deref(), Some("hello"));
        assert!(!subscriber.is_closed());
    }

    #[tokio::test]
    async fn test_channel_subscriber_closed_when_receiver_dropped() {
        let (subscriber, rx) = ChannelSubscriber::new(4);

        let mut closed = tokio_test::task::spawn(subscriber.closed());
        tokio_test::assert_pending!(closed.poll());

        drop(rx);
        tokio_test::assert_ready!(closed.poll());
        drop(closed);

        assert!(subscriber.is_closed());
        assert!(matches!(
            subscriber.send(Arc::from("late")).await,
            Err(DeliveryError::Disconnected)
        ));
    }
}
