//! Health and maintenance response bodies.

use serde::Serialize;
use utoipa::ToSchema;

/// `GET /health` response.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Always `"healthy"` when the process answers.
    pub status: String,
    /// RFC 3339 server time.
    pub timestamp: String,
    /// Crate version.
    pub version: String,
    /// Event bus statistics.
    pub event_bus: EventBusStats,
}

/// Snapshot of the event bus registry and overflow counter.
#[derive(Debug, Serialize, ToSchema)]
pub struct EventBusStats {
    /// Registered channels per topic.
    pub subscribers: Vec<TopicSubscribers>,
    /// Deliveries abandoned since startup.
    pub dropped_deliveries: u64,
}

/// Subscriber count of one topic.
#[derive(Debug, Serialize, ToSchema)]
pub struct TopicSubscribers {
    /// Topic name, e.g. `listUpdated`.
    pub topic: String,
    /// Registered channels, duplicates included.
    pub subscribers: usize,
}

/// `POST /search/reindex` response.
#[derive(Debug, Serialize, ToSchema)]
pub struct ReindexResponse {
    /// Always `"accepted"`.
    pub status: String,
    /// Processors the request reached. `0` means nothing will run.
    pub subscribers: usize,
}
