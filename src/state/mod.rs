// World state engine: entity store, subscriber registry, fan-out

mod engine;
mod entity;
mod metrics;
mod registry;
mod stats_reporter;
mod store;

pub use engine::WorldEngine;
pub use entity::{FieldMap, Notification, World};
pub use metrics::{StatsSnapshot, StatsTracker};
pub use registry::{SubscriberId, SubscriberRegistry, Subscription};
pub use stats_reporter::run_stats_reporter;
pub use store::EntityStore;
