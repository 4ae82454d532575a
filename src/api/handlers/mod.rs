//! REST endpoint handlers organized by resource.

pub mod items;
pub mod lists;
pub mod search;
pub mod system;

use axum::Router;

use crate::app_state::AppState;

/// Composes all resource routes under `/api/v1`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(lists::routes())
        .merge(items::routes())
        .merge(search::routes())
}
