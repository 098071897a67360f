use dashmap::DashMap;
use tokio::sync::mpsc;
use tracing::debug;
use uuid::Uuid;

/// Opaque subscriber identity (UUIDv7, time-ordered)
pub type SubscriberId = Uuid;

/// Receiving side of one subscriber's delivery queue.
///
/// Owned by the subscriber's egress loop. Dropping it marks the subscriber
/// dead; the next enqueue prunes it from the registry.
pub struct Subscription {
    id: SubscriberId,
    rx: mpsc::UnboundedReceiver<String>,
}

impl Subscription {
    pub fn id(&self) -> SubscriberId {
        self.id
    }

    /// Wait for the next payload (FIFO).
    ///
    /// Returns `None` once the subscriber has been unregistered and its
    /// remaining backlog drained.
    pub async fn recv(&mut self) -> Option<String> {
        self.rx.recv().await
    }

    /// Next payload if one is already queued
    pub fn try_recv(&mut self) -> Option<String> {
        self.rx.try_recv().ok()
    }
}

/// Live set of subscribers, each with a private unbounded FIFO queue.
///
/// Enqueue never waits: a stalled subscriber accumulates backlog instead of
/// slowing delivery to anyone else.
pub struct SubscriberRegistry {
    queues: DashMap<SubscriberId, mpsc::UnboundedSender<String>>,
}

impl SubscriberRegistry {
    pub fn new() -> Self {
        Self {
            queues: DashMap::new(),
        }
    }

    /// Add a new subscriber with an empty queue
    pub fn register(&self) -> Subscription {
        let (tx, rx) = mpsc::unbounded_channel();
        let id = Uuid::now_v7();

        self.queues.insert(id, tx);
        debug!(subscriber_id = %id, "Subscriber registered");

        Subscription { id, rx }
    }

    /// Remove a subscriber. Idempotent; returns whether it was still live.
    pub fn unregister(&self, id: &SubscriberId) -> bool {
        let removed = self.queues.remove(id).is_some();
        if removed {
            debug!(subscriber_id = %id, "Subscriber unregistered");
        }
        removed
    }

    /// Append a payload to one subscriber's queue.
    ///
    /// Returns `false` if the subscriber is not live. A subscriber whose
    /// receiver is gone is removed.
    pub fn enqueue(&self, id: &SubscriberId, payload: String) -> bool {
        let delivered = match self.queues.get(id) {
            Some(tx) => tx.send(payload).is_ok(),
            None => return false,
        };

        if !delivered {
            self.unregister(id);
        }
        delivered
    }

    /// Append a copy of `payload` to every live subscriber's queue.
    ///
    /// Returns the number of queues that accepted it.
    pub fn broadcast(&self, payload: &str) -> usize {
        let mut delivered = 0;
        let mut dead = Vec::new();

        for entry in self.queues.iter() {
            if entry.value().send(payload.to_string()).is_ok() {
                delivered += 1;
            } else {
                dead.push(*entry.key());
            }
        }

        // Removal must wait until the iterator has released its shard guards
        for id in &dead {
            self.unregister(id);
        }

        delivered
    }

    /// Wait for the next payload on `subscription`
    pub async fn dequeue_blocking(&self, subscription: &mut Subscription) -> Option<String> {
        subscription.recv().await
    }

    pub fn is_live(&self, id: &SubscriberId) -> bool {
        self.queues.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.queues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queues.is_empty()
    }
}

impl Default for SubscriberRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn unregister_twice_is_noop() {
        let registry = SubscriberRegistry::new();
        let sub = registry.register();

        assert!(registry.unregister(&sub.id()));
        assert!(!registry.unregister(&sub.id()));
        assert!(registry.is_empty());
    }

    #[test]
    fn queue_is_fifo() {
        let registry = SubscriberRegistry::new();
        let mut sub = registry.register();

        for i in 0..5 {
            assert!(registry.enqueue(&sub.id(), format!("msg-{}", i)));
        }

        for i in 0..5 {
            assert_eq!(sub.try_recv(), Some(format!("msg-{}", i)));
        }
        assert_eq!(sub.try_recv(), None);
    }

    #[test]
    fn enqueue_to_unknown_subscriber_fails() {
        let registry = SubscriberRegistry::new();
        assert!(!registry.enqueue(&Uuid::now_v7(), "x".to_string()));
    }

    #[test]
    fn dropped_receiver_is_pruned_on_broadcast() {
        let registry = SubscriberRegistry::new();
        let mut alive = registry.register();
        let dead = registry.register();
        let dead_id = dead.id();
        drop(dead);

        assert_eq!(registry.broadcast("hello"), 1);
        assert!(!registry.is_live(&dead_id));
        assert_eq!(registry.len(), 1);
        assert_eq!(alive.try_recv().as_deref(), Some("hello"));
    }

    #[test]
    fn dropped_receiver_is_pruned_on_enqueue() {
        let registry = SubscriberRegistry::new();
        let sub = registry.register();
        let id = sub.id();
        drop(sub);

        assert!(!registry.enqueue(&id, "x".to_string()));
        assert!(!registry.is_live(&id));
    }

    #[test]
    fn slow_subscriber_does_not_block_others() {
        let registry = SubscriberRegistry::new();
        let _stalled = registry.register();
        let mut fast = registry.register();

        for i in 0..10_000 {
            registry.broadcast(&i.to_string());
        }

        assert_eq!(fast.try_recv().as_deref(), Some("0"));
    }

    #[tokio::test]
    async fn dequeue_blocking_waits_for_payload() {
        let registry = std::sync::Arc::new(SubscriberRegistry::new());
        let mut sub = registry.register();
        let id = sub.id();

        let producer = std::sync::Arc::clone(&registry);
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            producer.enqueue(&id, "late".to_string());
        });

        let payload = tokio::time::timeout(Duration::from_secs(2), registry.dequeue_blocking(&mut sub))
            .await
            .unwrap();
        assert_eq!(payload.as_deref(), Some("late"));
    }

    #[tokio::test]
    async fn recv_ends_after_unregister_and_drain() {
        let registry = SubscriberRegistry::new();
        let mut sub = registry.register();

        registry.enqueue(&sub.id(), "last".to_string());
        registry.unregister(&sub.id());

        assert_eq!(sub.recv().await.as_deref(), Some("last"));
        assert_eq!(sub.recv().await, None);
    }
}
