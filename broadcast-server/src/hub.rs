//! Fan-out of serialized events to a dynamic set of subscribers.
//!
//! The `BroadcastHub` owns the subscriber set. Each subscriber gets a bounded
//! outbox drained by its own delivery task, so `publish` never waits on the
//! network: it serializes the event once and enqueues the message for every
//! current subscriber. A subscriber whose outbox is full, whose peer has
//! closed, or whose transport reports a delivery failure is evicted.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::RwLock;
use serde::Serialize;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::HubConfig;
use crate::error::HubError;
use crate::subscriber::{Subscriber, SubscriberId};

/// Why a subscriber was removed by the hub rather than by leaving.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvictionReason {
    /// The peer had already disconnected
    Closed,
    /// The outbox was full; the subscriber cannot keep up
    Lagging,
    /// The transport failed to deliver a message
    DeliveryFailed,
}

impl std::fmt::Display for EvictionReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EvictionReason::Closed => write!(f, "peer closed"),
            EvictionReason::Lagging => write!(f, "outbox full"),
            EvictionReason::DeliveryFailed => write!(f, "delivery failed"),
        }
    }
}

/// Point-in-time hub counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HubStats {
    /// Events serialized by `publish` (zero-subscriber publishes are not counted)
    pub messages_serialized: u64,
    /// Messages handed successfully to a subscriber transport
    pub messages_delivered: u64,
    pub subscribers_joined: u64,
    pub subscribers_evicted: u64,
}

#[derive(Default)]
struct HubCounters {
    messages_serialized: AtomicU64,
    messages_delivered: AtomicU64,
    subscribers_joined: AtomicU64,
    subscribers_evicted: AtomicU64,
}

struct SubscriberEntry {
    subscriber: Arc<dyn Subscriber>,
    outbox: mpsc::Sender<Arc<str>>,
    delivery: JoinHandle<()>,
}

impl Drop for SubscriberEntry {
    fn drop(&mut self) {
        // Abandon in-flight and queued deliveries
        self.delivery.abort();
    }
}

struct HubInner {
    subscribers: RwLock<HashMap<SubscriberId, SubscriberEntry>>,
    next_id: AtomicU64,
    closed: AtomicBool,
    counters: HubCounters,
    config: HubConfig,
}

/// Broadcasts serialized events to every joined subscriber.
///
/// Cloning is cheap and yields a handle to the same subscriber set.
#[derive(Clone)]
pub struct BroadcastHub {
    inner: Arc<HubInner>,
}

impl BroadcastHub {
    pub fn new(config: HubConfig) -> Self {
        Self {
            inner: Arc::new(HubInner {
                subscribers: RwLock::new(HashMap::new()),
                next_id: AtomicU64::new(1),
                closed: AtomicBool::new(false),
                counters: HubCounters::default(),
                config,
            }),
        }
    }

    /// Add a subscriber and start its delivery task.
    ///
    /// Must be called from within a Tokio runtime. Fails only once the hub
    /// has been closed.
    pub fn join(&self, subscriber: Arc<dyn Subscriber>) -> Result<SubscriberId, HubError> {
        if self.inner.closed.load(Ordering::Acquire) {
            return Err(HubError::Closed);
        }

        let id = SubscriberId::new(self.inner.next_id.fetch_add(1, Ordering::Relaxed));
        let (outbox, queue) = mpsc::channel(self.inner.config.outbox_capacity.max(1));
        let delivery = tokio::spawn(deliver(
            id,
            Arc::clone(&subscriber),
            queue,
            Arc::downgrade(&self.inner),
        ));

        let entry = SubscriberEntry {
            subscriber,
            outbox,
            delivery,
        };

        {
            let mut subscribers = self.inner.subscribers.write();
            // close_all may have run between the check above and this lock
            if self.inner.closed.load(Ordering::Acquire) {
                return Err(HubError::Closed);
            }
            subscribers.insert(id, entry);
        }

        self.inner
            .counters
            .subscribers_joined
            .fetch_add(1, Ordering::Relaxed);
        debug!(subscriber = %id, "Subscriber joined");
        Ok(id)
    }

    /// Remove a subscriber. Returns `false` if it was not present.
    pub fn leave(&self, id: SubscriberId) -> bool {
        self.inner.remove(id).is_some()
    }

    /// Serialize `event` once and queue it for every current subscriber.
    ///
    /// Never waits on a subscriber. Subscribers that are closed or whose outbox
    /// is full are evicted before this returns. With no subscribers the event
    /// is not serialized at all. Returns the number of subscribers the message
    /// was queued for.
    pub fn publish<E: Serialize + ?Sized>(&self, event: &E) -> Result<usize, HubError> {
        let mut evicted = Vec::new();
        let queued = {
            let subscribers = self.inner.subscribers.read();
            if subscribers.is_empty() {
                return Ok(0);
            }

            let message: Arc<str> = serde_json::to_string(event)?.into();
            self.inner
                .counters
                .messages_serialized
                .fetch_add(1, Ordering::Relaxed);

            let mut queued = 0;
            for (id, entry) in subscribers.iter() {
                if entry.subscriber.is_closed() {
                    evicted.push((*id, EvictionReason::Closed));
                    continue;
                }
                match entry.outbox.try_send(Arc::clone(&message)) {
                    Ok(()) => queued += 1,
                    Err(TrySendError::Full(_)) => evicted.push((*id, EvictionReason::Lagging)),
                    Err(TrySendError::Closed(_)) => {
                        evicted.push((*id, EvictionReason::DeliveryFailed))
                    }
                }
            }
            queued
        };

        for (id, reason) in evicted {
            self.inner.evict(id, reason);
        }

        Ok(queued)
    }

    /// Disconnect every subscriber and refuse further joins.
    pub fn close_all(&self) {
        self.inner.closed.store(true, Ordering::Release);
        let drained: Vec<(SubscriberId, SubscriberEntry)> =
            self.inner.subscribers.write().drain().collect();

        if !drained.is_empty() {
            info!("Disconnecting {} subscribers", drained.len());
        }
        for (_, entry) in drained {
            entry.subscriber.close();
        }
    }

    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::Acquire)
    }

    pub fn len(&self) -> usize {
        self.inner.subscribers.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.subscribers.read().is_empty()
    }

    pub fn contains(&self, id: SubscriberId) -> bool {
        self.inner.subscribers.read().contains_key(&id)
    }

    /// Current subscriber ids, in join order.
    pub fn subscriber_ids(&self) -> Vec<SubscriberId> {
        let mut ids: Vec<SubscriberId> = self.inner.subscribers.read().keys().copied().collect();
        ids.sort();
        ids
    }

    pub fn stats(&self) -> HubStats {
        let counters = &self.inner.counters;
        HubStats {
            messages_serialized: counters.messages_serialized.load(Ordering::Relaxed),
            messages_delivered: counters.messages_delivered.load(Ordering::Relaxed),
            subscribers_joined: counters.subscribers_joined.load(Ordering::Relaxed),
            subscribers_evicted: counters.subscribers_evicted.load(Ordering::Relaxed),
        }
    }
}

impl Default for BroadcastHub {
    fn default() -> Self {
        Self::new(HubConfig::default())
    }
}

impl std::fmt::Debug for BroadcastHub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BroadcastHub")
            .field("subscribers", &self.len())
            .field("closed", &self.is_closed())
            .finish()
    }
}

impl HubInner {
    fn remove(&self, id: SubscriberId) -> Option<Arc<dyn Subscriber>> {
        let entry = self.subscribers.write().remove(&id)?;
        entry.subscriber.close();
        Some(Arc::clone(&entry.subscriber))
    }

    fn evict(&self, id: SubscriberId, reason: EvictionReason) {
        if self.remove(id).is_some() {
            self.counters
                .subscribers_evicted
                .fetch_add(1, Ordering::Relaxed);
            warn!(subscriber = %id, "Evicted subscriber: {}", reason);
        }
    }
}

/// Drain one subscriber's outbox, in order, until it fails or is removed.
async fn deliver(
    id: SubscriberId,
    subscriber: Arc<dyn Subscriber>,
    mut queue: mpsc::Receiver<Arc<str>>,
    hub: Weak<HubInner>,
) {
    while let Some(message) = queue.recv().await {
        match subscriber.send(message).await {
            Ok(()) => {
                if let Some(hub) = hub.upgrade() {
                    hub.counters
                        .messages_delivered
                        .fetch_add(1, Ordering::Relaxed);
                }
            }
            Err(e) => {
                debug!(subscriber = %id, "Delivery failed: {}", e);
                if let Some(hub) = hub.upgrade() {
                    hub.evict(id, EvictionReason::DeliveryFailed);
                }
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::subscriber::ChannelSubscriber;
    use serde_json::json;

    #[tokio::test]
    async fn test_join_and_leave() {
        let hub = BroadcastHub::default();
        let (subscriber, _rx) = ChannelSubscriber::new(4);

        let id = hub.join(Arc::new(subscriber)).unwrap();
        assert_eq!(hub.len(), 1);
        assert!(hub.contains(id));

        assert!(hub.leave(id));
        assert!(hub.is_empty());

        // Leaving twice is a no-op
        assert!(!hub.leave(id));
    }

    #[tokio::test]
    async fn test_publish_without_subscribers_skips_serialization() {
        let hub = BroadcastHub::default();

        let queued = hub.publish(&json!({"event_type": "mouse_moved", "x": 1, "y": 2})).unwrap();
        assert_eq!(queued, 0);
        assert_eq!(hub.stats().messages_serialized, 0);
    }

    #[tokio::test]
    async fn test_publish_serializes_once_per_event() {
        let hub = BroadcastHub::default();
        let (first, mut first_rx) = ChannelSubscriber::new(4);
        let (second, mut second_rx) = ChannelSubscriber::new(4);
        hub.join(Arc::new(first)).unwrap();
        hub.join(Arc::new(second)).unwrap();

        let queued = hub.publish(&json!({"event_type": "key_pressed", "keycode": 30})).unwrap();
        assert_eq!(queued, 2);
        assert_eq!(hub.stats().messages_serialized, 1);

        let expected = r#"{"event_type":"key_pressed","keycode":30}"#;
        assert_eq!(first_rx.recv().await.as_deref(), Some(expected));
        assert_eq!(second_rx.recv().await.as_deref(), Some(expected));
    }

    #[tokio::test]
    async fn test_closed_subscriber_is_evicted_on_publish() {
        let hub = BroadcastHub::default();
        let (subscriber, rx) = ChannelSubscriber::new(4);
        let id = hub.join(Arc::new(subscriber)).unwrap();
        drop(rx);

        let queued = hub.publish(&json!({"n": 1})).unwrap();
        assert_eq!(queued, 0);
        assert!(!hub.contains(id));
        assert_eq!(hub.stats().subscribers_evicted, 1);
    }

    #[tokio::test]
    async fn test_zero_outbox_capacity_still_delivers() {
        let hub = BroadcastHub::new(HubConfig::new().with_outbox_capacity(0));
        let (subscriber, mut rx) = ChannelSubscriber::new(4);
        hub.join(Arc::new(subscriber)).unwrap();

        assert_eq!(hub.publish(&json!({"n": 1})).unwrap(), 1);
        assert_eq!(rx.recv().await.as_deref(), Some(r#"{"n":1}"#));
    }

    #[tokio::test]
    async fn test_close_all_refuses_new_subscribers() {
        let hub = BroadcastHub::default();
        let (subscriber, mut rx) = ChannelSubscriber::new(4);
        hub.join(Arc::new(subscriber)).unwrap();

        hub.close_all();
        assert!(hub.is_closed());
        assert!(hub.is_empty());

        // The subscriber's sender was dropped with its entry
        assert!(rx.recv().await.is_none());

        let (late, _late_rx) = ChannelSubscriber::new(4);
        assert!(matches!(hub.join(Arc::new(late)), Err(HubError::Closed)));
    }

    #[test]
    fn test_eviction_reason_display() {
        assert_eq!(EvictionReason::Lagging.to_string(), "outbox full");
        assert_eq!(EvictionReason::Closed.to_string(), "peer closed");
        assert_eq!(EvictionReason::DeliveryFailed.to_string(), "delivery failed");
    }
}
