//! Search maintenance handlers.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};

use crate::api::dto::ReindexResponse;
use crate::api::extractors::AuthUser;
use crate::app_state::AppState;

/// `POST /search/reindex` — Rebuild every search document.
///
/// Returns as soon as the request is on the bus; the reindex runs in the
/// background.
#[utoipa::path(
    post,
    path = "/api/v1/search/reindex",
    tag = "Search",
    summary = "Request a full reindex",
    params(("X-User-Id" = i32, Header, description = "Caller user ID")),
    responses(
        (status = 202, description = "Reindex requested", body = ReindexResponse),
    )
)]
pub async fn reindex(State(state): State<AppState>, AuthUser(user_id): AuthUser) -> impl IntoResponse {
    tracing::info!(%user_id, "reindex requested over HTTP");
    let subscribers = state.list_service.request_full_reindex();
    (
        StatusCode::ACCEPTED,
        Json(ReindexResponse {
            status: "accepted".to_string(),
            subscribers,
        }),
    )
}

/// Search routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/search/reindex", post(reindex))
}
