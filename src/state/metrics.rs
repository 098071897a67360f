use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

/// Counters for the world engine
pub struct StatsTracker {
    started_at: DateTime<Utc>,

    /// Store mutations that produced a notification
    mutations: AtomicU64,

    /// Payloads accepted by subscriber queues (one per subscriber per mutation)
    notifications_enqueued: AtomicU64,

    /// Subscribers registered since startup
    connections_total: AtomicU64,
}

impl StatsTracker {
    pub fn new() -> Self {
        Self {
            started_at: Utc::now(),
            mutations: AtomicU64::new(0),
            notifications_enqueued: AtomicU64::new(0),
            connections_total: AtomicU64::new(0),
        }
    }

    /// Record one mutation and how many queues its notification reached
    pub fn record_fan_out(&self, delivered: usize) {
        self.mutations.fetch_add(1, Ordering::Relaxed);
        self.notifications_enqueued
            .fetch_add(delivered as u64, Ordering::Relaxed);
    }

    pub fn record_connection(&self) {
        self.connections_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self, entity_count: usize, subscriber_count: usize) -> StatsSnapshot {
        let now = Utc::now();
        StatsSnapshot {
            started_at: self.started_at,
            uptime_seconds: (now - self.started_at).num_seconds(),
            entities: entity_count,
            subscribers: subscriber_count,
            mutations: self.mutations.load(Ordering::Relaxed),
            notifications_enqueued: self.notifications_enqueued.load(Ordering::Relaxed),
            connections_total: self.connections_total.load(Ordering::Relaxed),
        }
    }
}

impl Default for StatsTracker {
    fn default() -> Self {
        Self::new()
    }
}

/// Point-in-time view of engine counters
#[derive(Debug, Clone, Serialize)]
pub struct StatsSnapshot {
    #[serde(rename = "startedAt")]
    pub started_at: DateTime<Utc>,
    #[serde(rename = "uptimeSeconds")]
    pub uptime_seconds: i64,
    pub entities: usize,
    pub subscribers: usize,
    pub mutations: u64,
    #[serde(rename = "notificationsEnqueued")]
    pub notifications_enqueued: u64,
    #[serde(rename = "connectionsTotal")]
    pub connections_total: u64,
}
