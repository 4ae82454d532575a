//! Database row shapes for lists and items.

use chrono::{DateTime, Utc};

use crate::domain::{ItemId, List, ListId, ListItem, UserId};

/// A row of the `lists` table:
/// `(id, user_id, name, item_count, created_at, updated_at)`.
pub type ListRow = (i32, i32, String, i32, DateTime<Utc>, DateTime<Utc>);

/// A row of the `list_items` table:
/// `(id, list_id, title, description, position, created_at, updated_at)`.
pub type ItemRow = (i32, i32, String, String, i32, DateTime<Utc>, DateTime<Utc>);

/// Builds an aggregate from its list row and item rows.
#[must_use]
pub fn list_from_rows(row: ListRow, items: Vec<ItemRow>) -> List {
    let (id, user_id, name, item_count, created_at, updated_at) = row;
    List {
        id: ListId::new(id),
        user_id: UserId::new(user_id),
        name,
        item_count,
        items: items.into_iter().map(item_from_row).collect(),
        created_at,
        updated_at,
    }
}

/// Builds a domain item from its row.
#[must_use]
pub fn item_from_row(row: ItemRow) -> ListItem {
    let (id, list_id, title, description, position, created_at, updated_at) = row;
    ListItem {
        id: ItemId::new(id),
        list_id: ListId::new(list_id),
        title,
        description,
        position,
        created_at,
        updated_at,
    }
}
