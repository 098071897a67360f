use crate::state::entity::{FieldMap, Notification, World};
use crate::state::metrics::{StatsSnapshot, StatsTracker};
use crate::state::registry::{SubscriberId, SubscriberRegistry, Subscription};
use crate::state::store::EntityStore;
use serde_json::Value;
use tracing::{debug, info};

/// World engine: entity store plus notification fan-out to subscribers.
///
/// Every mutation fans out the entity's post-mutation state while the
/// entity's guard is still held, so subscribers see notifications for one
/// entity in the order the mutations were applied.
pub struct WorldEngine {
    store: EntityStore,
    registry: SubscriberRegistry,
    pub stats: StatsTracker,
}

impl WorldEngine {
    pub fn new() -> Self {
        Self {
            store: EntityStore::new(),
            registry: SubscriberRegistry::new(),
            stats: StatsTracker::new(),
        }
    }

    /// Set a single field, creating the entity if needed
    pub fn merge(&self, name: &str, field: &str, value: Value) -> Notification {
        self.store.update_with(name, |fields, _| {
            fields.insert(field.to_string(), value);
            self.fan_out(name, fields)
        })
    }

    /// Overwrite the entity's whole field mapping
    pub fn replace(&self, name: &str, fields: FieldMap) -> Notification {
        self.store
            .replace_with(name, fields, |current| self.fan_out(name, current))
    }

    /// Current field mapping, empty if the entity does not exist
    pub fn get(&self, name: &str) -> FieldMap {
        self.store.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.store.contains(name)
    }

    /// Whole world at a single instant
    pub fn snapshot(&self) -> World {
        self.store.snapshot()
    }

    /// Empty the world. Subscribers are not notified.
    pub fn clear(&self) {
        self.store.clear();
        info!("World cleared");
    }

    /// Apply an inbound update for one entity.
    ///
    /// Unknown entities are created with exactly `fields` (replace). Known
    /// entities get a per-field merge of only the fields present, producing
    /// one notification per field; fields not in the payload are untouched.
    /// The existence check and the writes run under one guard.
    pub fn apply_update(&self, name: &str, fields: FieldMap) -> Vec<Notification> {
        self.store.update_with(name, |current, existed| {
            if existed {
                fields
                    .into_iter()
                    .map(|(field, value)| {
                        current.insert(field, value);
                        self.fan_out(name, current)
                    })
                    .collect()
            } else {
                *current = fields;
                vec![self.fan_out(name, current)]
            }
        })
    }

    /// Apply a multi-entity inbound payload, entity by entity
    pub fn apply_world_update(&self, update: World) -> Vec<Notification> {
        update
            .into_iter()
            .flat_map(|(name, fields)| self.apply_update(&name, fields))
            .collect()
    }

    /// Replace the whole world: clear, then replace every given entity.
    ///
    /// The clear is silent; each replaced entity is fanned out.
    pub fn load_world(&self, world: World) {
        self.clear();
        for (name, fields) in world {
            self.replace(&name, fields);
        }
    }

    /// Register a new subscriber and replay the current world into its queue.
    ///
    /// The subscriber is live before the replay starts, and each entity is
    /// replayed under its guard, so a concurrent mutation is either replayed
    /// or delivered after the replayed state, never before it.
    pub fn subscribe(&self) -> Subscription {
        let subscription = self.registry.register();
        let id = subscription.id();
        self.stats.record_connection();

        let mut replayed = 0usize;
        self.store.for_each(|name, fields| {
            let payload = Notification::new(name, fields.clone()).to_payload();
            if self.registry.enqueue(&id, payload) {
                replayed += 1;
            }
        });

        info!(subscriber_id = %id, replayed, "Subscriber connected");
        subscription
    }

    /// Register without replay
    pub fn register(&self) -> Subscription {
        let subscription = self.registry.register();
        self.stats.record_connection();
        subscription
    }

    /// Remove a subscriber. Idempotent.
    pub fn unregister(&self, id: &SubscriberId) -> bool {
        let removed = self.registry.unregister(id);
        if removed {
            info!(subscriber_id = %id, "Subscriber disconnected");
        }
        removed
    }

    /// Wait for the subscriber's next payload
    pub async fn dequeue_blocking(&self, subscription: &mut Subscription) -> Option<String> {
        self.registry.dequeue_blocking(subscription).await
    }

    pub fn subscriber_count(&self) -> usize {
        self.registry.len()
    }

    pub fn entity_count(&self) -> usize {
        self.store.len()
    }

    pub fn stats_snapshot(&self) -> StatsSnapshot {
        self.stats.snapshot(self.entity_count(), self.subscriber_count())
    }

    /// Build the notification for `name` and enqueue it to every live subscriber
    fn fan_out(&self, name: &str, fields: &FieldMap) -> Notification {
        let notification = Notification::new(name, fields.clone());
        let delivered = self.registry.broadcast(&notification.to_payload());
        self.stats.record_fan_out(delivered);

        debug!(entity = %name, delivered, "Notification fanned out");
        notification
    }
}

impl Default for WorldEngine {
    fn default() -> Self {
        Self::new()
    }
}
