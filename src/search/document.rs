//! Denormalised search documents.

use serde::{Deserialize, Serialize};

use crate::domain::{List, ListId, UserId};

/// Title and description of one item, flattened into its list document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemDocument {
    /// Item title.
    pub title: String,
    /// Item description.
    pub description: String,
}

/// Search document for one list and all of its items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListDocument {
    /// Document key: the list ID as a string.
    #[serde(rename = "objectID")]
    pub object_id: String,
    /// Owner of the list, for per-user search filtering.
    pub user_id: UserId,
    /// List name.
    pub name: String,
    /// Items ordered by position.
    pub items: Vec<ItemDocument>,
}

impl ListDocument {
    /// Object ID under which a list is indexed.
    #[must_use]
    pub fn object_id_for(list_id: ListId) -> String {
        list_id.to_string()
    }
}

impl From<&List> for ListDocument {
    fn from(list: &List) -> Self {
        let mut items: Vec<_> = list.items.iter().collect();
        items.sort_by_key(|item| (item.position, item.id));
        Self {
            object_id: Self::object_id_for(list.id),
            user_id: list.user_id,
            name: list.name.clone(),
            items: items
                .into_iter()
                .map(|item| ItemDocument {
                    title: item.title.clone(),
                    description: item.description.clone(),
                })
                .collect(),
        }
    }
}
