//! Item handlers: add, delete, move between lists.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{delete, post};
use axum::{Json, Router};

use crate::api::dto::{AddItemRequest, ItemDto, MoveItemRequest};
use crate::api::extractors::AuthUser;
use crate::app_state::AppState;
use crate::domain::{ItemId, ListId};
use crate::error::{AppError, ErrorResponse};

/// `POST /lists/{list_id}/items` — Append an item to a list.
///
/// # Errors
///
/// Returns [`AppError::BadRequest`] for a blank title and
/// [`AppError::NotFound`] if the caller owns no such list.
#[utoipa::path(
    post,
    path = "/api/v1/lists/{list_id}/items",
    tag = "Items",
    summary = "Add an item",
    request_body = AddItemRequest,
    params(
        ("list_id" = i32, Path, description = "List ID"),
        ("X-User-Id" = i32, Header, description = "Caller user ID"),
    ),
    responses(
        (status = 201, description = "Item added at the end of the list", body = ItemDto),
        (status = 400, description = "Blank title", body = ErrorResponse),
        (status = 404, description = "List not found", body = ErrorResponse),
    )
)]
pub async fn add_item(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(list_id): Path<i32>,
    Json(req): Json<AddItemRequest>,
) -> Result<impl IntoResponse, AppError> {
    let item = state
        .list_service
        .add_item(ListId::new(list_id), user_id, &req.title, &req.description)
        .await?;
    Ok((StatusCode::CREATED, Json(ItemDto::from(&item))))
}

/// `DELETE /lists/{list_id}/items/{item_id}` — Remove an item.
///
/// # Errors
///
/// Returns [`AppError::NotFound`] if the list or the item does not exist.
#[utoipa::path(
    delete,
    path = "/api/v1/lists/{list_id}/items/{item_id}",
    tag = "Items",
    summary = "Delete an item",
    params(
        ("list_id" = i32, Path, description = "List ID"),
        ("item_id" = i32, Path, description = "Item ID"),
        ("X-User-Id" = i32, Header, description = "Caller user ID"),
    ),
    responses(
        (status = 204, description = "Item deleted"),
        (status = 404, description = "List or item not found", body = ErrorResponse),
    )
)]
pub async fn delete_item(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path((list_id, item_id)): Path<(i32, i32)>,
) -> Result<impl IntoResponse, AppError> {
    state
        .list_service
        .delete_item(ListId::new(list_id), ItemId::new(item_id), user_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `POST /lists/{list_id}/items/{item_id}/move` — Move an item to the end
/// of another list.
///
/// # Errors
///
/// Returns [`AppError::BadRequest`] if either list or the item does not
/// exist, and [`AppError::Unexpected`] if a write fails.
#[utoipa::path(
    post,
    path = "/api/v1/lists/{list_id}/items/{item_id}/move",
    tag = "Items",
    summary = "Move an item",
    description = "Moves the item to the end of the destination list. Both lists must belong to the caller. Publishes `listUpdated` for both lists.",
    request_body = MoveItemRequest,
    params(
        ("list_id" = i32, Path, description = "Origin list ID"),
        ("item_id" = i32, Path, description = "Item ID"),
        ("X-User-Id" = i32, Header, description = "Caller user ID"),
    ),
    responses(
        (status = 200, description = "Item as stored in the destination", body = ItemDto),
        (status = 400, description = "Unknown list or item", body = ErrorResponse),
        (status = 500, description = "Storage failure", body = ErrorResponse),
    )
)]
pub async fn move_item(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path((list_id, item_id)): Path<(i32, i32)>,
    Json(req): Json<MoveItemRequest>,
) -> Result<impl IntoResponse, AppError> {
    let item = state
        .list_service
        .move_list_item(
            ListId::new(list_id),
            ItemId::new(item_id),
            ListId::new(req.destination_list_id),
            user_id,
        )
        .await?;
    Ok(Json(ItemDto::from(&item)))
}

/// Item routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/lists/{list_id}/items", post(add_item))
        .route("/lists/{list_id}/items/{item_id}", delete(delete_item))
        .route("/lists/{list_id}/items/{item_id}/move", post(move_item))
}
