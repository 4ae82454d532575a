//! System endpoints: health check.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;

use crate::api::dto::{EventBusStats, HealthResponse, TopicSubscribers};
use crate::app_state::AppState;
use crate::events::Topic;

/// `GET /health` — Service health status.
#[utoipa::path(
    get,
    path = "/health",
    tag = "System",
    summary = "Health check",
    description = "Returns service health status, version, current timestamp, and event bus statistics.",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
    )
)]
pub async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    let bus = &state.event_bus;
    let subscribers = Topic::ALL
        .into_iter()
        .map(|topic| TopicSubscribers {
            topic: topic.as_str().to_string(),
            subscribers: bus.subscriber_count(topic),
        })
        .collect();

    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "healthy".to_string(),
            timestamp: Utc::now().to_rfc3339(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            event_bus: EventBusStats {
                subscribers,
                dropped_deliveries: bus.dropped_deliveries(),
            },
        }),
    )
}

/// System routes mounted at the root level (not under /api/v1).
pub fn routes() -> Router<AppState> {
    Router::new().route("/health", get(health_handler))
}
