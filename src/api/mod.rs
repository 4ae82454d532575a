//! REST API layer: route handlers, DTOs, and router composition.
//!
//! All resource endpoints are mounted under `/api/v1`; `/health` sits at
//! the root. Handlers only translate between HTTP and [`crate::service`].

pub mod dto;
pub mod extractors;
pub mod handlers;

use std::time::Duration;

use axum::Router;
use axum::http::StatusCode;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

use crate::app_state::AppState;

/// OpenAPI document for every REST endpoint.
#[derive(Debug, OpenApi)]
#[openapi(
    info(title = "listhub", description = "List management API"),
    paths(
        handlers::system::health_handler,
        handlers::lists::create_list,
        handlers::lists::get_list,
        handlers::lists::rename_list,
        handlers::lists::delete_list,
        handlers::items::add_item,
        handlers::items::delete_item,
        handlers::items::move_item,
        handlers::search::reindex,
    ),
    components(schemas(crate::error::ErrorResponse, crate::error::ErrorBody)),
    tags(
        (name = "Lists", description = "List lifecycle"),
        (name = "Items", description = "Items within lists"),
        (name = "Search", description = "Search index maintenance"),
        (name = "System", description = "Operational endpoints"),
    )
)]
pub struct ApiDoc;

/// Builds the complete API router with all REST endpoints.
pub fn build_router() -> Router<AppState> {
    Router::new()
        .nest("/api/v1", handlers::routes())
        .merge(handlers::system::routes())
}

/// Builds the router with tracing, CORS, and a per-request timeout, bound
/// to `state`.
pub fn build_app(state: AppState, request_timeout: Duration) -> Router {
    build_router()
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            request_timeout,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
