//! List handlers: create, get, rename, delete.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::api::dto::{CreateListRequest, ListDto, RenameListRequest};
use crate::api::extractors::AuthUser;
use crate::app_state::AppState;
use crate::domain::ListId;
use crate::error::{AppError, ErrorResponse};

/// `POST /lists` — Create an empty list.
///
/// # Errors
///
/// Returns [`AppError::BadRequest`] for a blank name.
#[utoipa::path(
    post,
    path = "/api/v1/lists",
    tag = "Lists",
    summary = "Create a list",
    description = "Creates an empty list owned by the caller and publishes `listCreated`.",
    request_body = CreateListRequest,
    params(("X-User-Id" = i32, Header, description = "Caller user ID")),
    responses(
        (status = 201, description = "List created", body = ListDto),
        (status = 400, description = "Blank name", body = ErrorResponse),
        (status = 401, description = "Missing caller identity", body = ErrorResponse),
    )
)]
pub async fn create_list(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(req): Json<CreateListRequest>,
) -> Result<impl IntoResponse, AppError> {
    let list = state.list_service.create_list(user_id, &req.name).await?;
    Ok((StatusCode::CREATED, Json(ListDto::from(&list))))
}

/// `GET /lists/{list_id}` — Get a list with its items.
///
/// # Errors
///
/// Returns [`AppError::NotFound`] if the caller owns no such list.
#[utoipa::path(
    get,
    path = "/api/v1/lists/{list_id}",
    tag = "Lists",
    summary = "Get a list",
    params(
        ("list_id" = i32, Path, description = "List ID"),
        ("X-User-Id" = i32, Header, description = "Caller user ID"),
    ),
    responses(
        (status = 200, description = "List with items", body = ListDto),
        (status = 404, description = "List not found", body = ErrorResponse),
    )
)]
pub async fn get_list(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(list_id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let list = state
        .list_service
        .get_list(ListId::new(list_id), user_id)
        .await?;
    Ok(Json(ListDto::from(&list)))
}

/// `PATCH /lists/{list_id}` — Rename a list.
///
/// # Errors
///
/// Returns [`AppError::BadRequest`] for a blank name and
/// [`AppError::NotFound`] if the caller owns no such list.
#[utoipa::path(
    patch,
    path = "/api/v1/lists/{list_id}",
    tag = "Lists",
    summary = "Rename a list",
    request_body = RenameListRequest,
    params(
        ("list_id" = i32, Path, description = "List ID"),
        ("X-User-Id" = i32, Header, description = "Caller user ID"),
    ),
    responses(
        (status = 200, description = "Renamed list", body = ListDto),
        (status = 400, description = "Blank name", body = ErrorResponse),
        (status = 404, description = "List not found", body = ErrorResponse),
    )
)]
pub async fn rename_list(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(list_id): Path<i32>,
    Json(req): Json<RenameListRequest>,
) -> Result<impl IntoResponse, AppError> {
    let list = state
        .list_service
        .rename_list(ListId::new(list_id), user_id, &req.name)
        .await?;
    Ok(Json(ListDto::from(&list)))
}

/// `DELETE /lists/{list_id}` — Delete a list and its items.
///
/// # Errors
///
/// Returns [`AppError::NotFound`] if the caller owns no such list.
#[utoipa::path(
    delete,
    path = "/api/v1/lists/{list_id}",
    tag = "Lists",
    summary = "Delete a list",
    params(
        ("list_id" = i32, Path, description = "List ID"),
        ("X-User-Id" = i32, Header, description = "Caller user ID"),
    ),
    responses(
        (status = 204, description = "List deleted"),
        (status = 404, description = "List not found", body = ErrorResponse),
    )
)]
pub async fn delete_list(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(list_id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    state
        .list_service
        .delete_list(ListId::new(list_id), user_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// List routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/lists", post(create_list))
        .route(
            "/lists/{list_id}",
            get(get_list).patch(rename_list).delete(delete_list),
        )
}
