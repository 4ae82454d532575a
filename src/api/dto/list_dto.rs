//! Request and response bodies for list and item endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{List, ListItem};

/// Body of `POST /lists`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateListRequest {
    /// Display name; must not be blank.
    pub name: String,
}

/// Body of `PATCH /lists/{list_id}`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct RenameListRequest {
    /// New display name; must not be blank.
    pub name: String,
}

/// Body of `POST /lists/{list_id}/items`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct AddItemRequest {
    /// Short title; must not be blank.
    pub title: String,
    /// Free-form description.
    #[serde(default)]
    pub description: String,
}

/// Body of `POST /lists/{list_id}/items/{item_id}/move`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct MoveItemRequest {
    /// List the item should be appended to.
    pub destination_list_id: i32,
}

/// One item as returned by the API.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ItemDto {
    /// Item ID.
    pub id: i32,
    /// List the item belongs to.
    pub list_id: i32,
    /// Short title.
    pub title: String,
    /// Free-form description.
    pub description: String,
    /// Ordering key within the list.
    pub position: i32,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last change timestamp.
    pub updated_at: DateTime<Utc>,
}

impl From<&ListItem> for ItemDto {
    fn from(item: &ListItem) -> Self {
        Self {
            id: item.id.get(),
            list_id: item.list_id.get(),
            title: item.title.clone(),
            description: item.description.clone(),
            position: item.position,
            created_at: item.created_at,
            updated_at: item.updated_at,
        }
    }
}

/// A list with its items, ordered by position.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ListDto {
    /// List ID.
    pub id: i32,
    /// Owner.
    pub user_id: i32,
    /// Display name.
    pub name: String,
    /// Projected item count. Updated asynchronously, so it may lag
    /// behind `items`.
    pub item_count: i32,
    /// Items ordered by position.
    pub items: Vec<ItemDto>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last change timestamp.
    pub updated_at: DateTime<Utc>,
}

impl From<&List> for ListDto {
    fn from(list: &List) -> Self {
        let mut items: Vec<ItemDto> = list.items.iter().map(ItemDto::from).collect();
        items.sort_by_key(|item| (item.position, item.id));
        Self {
            id: list.id.get(),
            user_id: list.user_id.get(),
            name: list.name.clone(),
            item_count: list.item_count,
            items,
            created_at: list.created_at,
            updated_at: list.updated_at,
        }
    }
}
