//! List aggregate: a named, user-owned collection of ordered items.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{ItemId, ListId, UserId};

/// A single entry of a [`List`].
///
/// An item belongs to exactly one list at a time. `position` orders items
/// within their list; positions are not required to be contiguous.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListItem {
    /// Item identifier (assigned by the repository).
    pub id: ItemId,
    /// List the item currently belongs to.
    pub list_id: ListId,
    /// Short title.
    pub title: String,
    /// Free-form description.
    pub description: String,
    /// Ordering key within the owning list.
    pub position: i32,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Timestamp of the last change.
    pub updated_at: DateTime<Utc>,
}

impl ListItem {
    /// Creates an item with both timestamps set to now.
    #[must_use]
    pub fn new(id: ItemId, list_id: ListId, title: String, description: String, position: i32) -> Self {
        let now = Utc::now();
        Self {
            id,
            list_id,
            title,
            description,
            position,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Aggregate root holding a list and its items.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct List {
    /// List identifier (assigned by the repository).
    pub id: ListId,
    /// Owner of the list.
    pub user_id: UserId,
    /// Display name.
    pub name: String,
    /// Projected number of items, maintained asynchronously.
    pub item_count: i32,
    /// Items in storage order.
    pub items: Vec<ListItem>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Timestamp of the last change.
    pub updated_at: DateTime<Utc>,
}

impl List {
    /// Creates an empty list.
    #[must_use]
    pub fn new(id: ListId, user_id: UserId, name: String) -> Self {
        let now = Utc::now();
        Self {
            id,
            user_id,
            name,
            item_count: 0,
            items: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Position an item appended to this list receives: one past the
    /// current maximum, or `0` for an empty list.
    #[must_use]
    pub fn next_position(&self) -> i32 {
        self.items
            .iter()
            .map(|item| item.position)
            .max()
            .map_or(0, |max| max.saturating_add(1))
    }

    /// Returns the item with the given ID, if present.
    #[must_use]
    pub fn item(&self, item_id: ItemId) -> Option<&ListItem> {
        self.items.iter().find(|item| item.id == item_id)
    }

    /// Detaches the item with the given ID from this list.
    pub fn take_item(&mut self, item_id: ItemId) -> Option<ListItem> {
        let index = self.items.iter().position(|item| item.id == item_id)?;
        self.updated_at = Utc::now();
        Some(self.items.remove(index))
    }

    /// Attaches `item` at the end of this list, rewriting its list
    /// reference and position. Returns the assigned position.
    pub fn append_item(&mut self, mut item: ListItem) -> i32 {
        let now = Utc::now();
        let position = self.next_position();
        item.list_id = self.id;
        item.position = position;
        item.updated_at = now;
        self.updated_at = now;
        self.items.push(item);
        position
    }
}
