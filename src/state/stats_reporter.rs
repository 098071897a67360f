use crate::state::WorldEngine;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval, MissedTickBehavior};
use tracing::info;

/// Periodically log engine counters
///
/// Runs until the task is dropped. Reading the counters never blocks
/// mutations.
pub async fn run_stats_reporter(engine: Arc<WorldEngine>, interval_seconds: u64) {
    let mut ticker = interval(Duration::from_secs(interval_seconds.max(1)));

    // Skip missed ticks to prevent backlog under load
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    // First tick completes immediately
    ticker.tick().await;

    loop {
        ticker.tick().await;

        let stats = engine.stats_snapshot();
        info!(
            entities = stats.entities,
            subscribers = stats.subscribers,
            mutations = stats.mutations,
            notifications_enqueued = stats.notifications_enqueued,
            connections_total = stats.connections_total,
            "World stats"
        );
    }
}
