//! In-memory list repository.
//!
//! Stores every aggregate in a single `BTreeMap` behind a
//! [`tokio::sync::RwLock`]. Used by tests and when the service runs with
//! `PERSISTENCE_ENABLED=false`.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicI32, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use super::{ListRepository, NewItem, RepositoryError};
use crate::domain::{ItemId, List, ListId, ListItem, UserId};

/// Volatile [`ListRepository`] implementation.
#[derive(Debug)]
pub struct InMemoryListRepository {
    lists: RwLock<BTreeMap<ListId, List>>,
    next_list_id: AtomicI32,
    next_item_id: AtomicI32,
}

impl InMemoryListRepository {
    /// Creates an empty repository. Generated IDs start at `1`.
    #[must_use]
    pub fn new() -> Self {
        Self {
            lists: RwLock::new(BTreeMap::new()),
            next_list_id: AtomicI32::new(1),
            next_item_id: AtomicI32::new(1),
        }
    }

    /// Stores `list` exactly as given, keeping its IDs.
    ///
    /// ID generation is advanced past every seeded ID so later inserts
    /// never collide.
    pub async fn seed(&self, list: List) {
        self.next_list_id
            .fetch_max(list.id.get().saturating_add(1), Ordering::Relaxed);
        for item in &list.items {
            self.next_item_id
                .fetch_max(item.id.get().saturating_add(1), Ordering::Relaxed);
        }
        self.lists.write().await.insert(list.id, list);
    }

    /// Number of stored lists.
    pub async fn len(&self) -> usize {
        self.lists.read().await.len()
    }

    /// Returns `true` if no list is stored.
    pub async fn is_empty(&self) -> bool {
        self.lists.read().await.is_empty()
    }
}

impl Default for InMemoryListRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ListRepository for InMemoryListRepository {
    async fn create_list(&self, user_id: UserId, name: &str) -> Result<List, RepositoryError> {
        let id = ListId::new(self.next_list_id.fetch_add(1, Ordering::Relaxed));
        let list = List::new(id, user_id, name.to_string());
        self.lists.write().await.insert(id, list.clone());
        Ok(list)
    }

    async fn find_list(
        &self,
        list_id: ListId,
        user_id: UserId,
    ) -> Result<Option<List>, RepositoryError> {
        let lists = self.lists.read().await;
        Ok(lists
            .get(&list_id)
            .filter(|list| list.user_id == user_id)
            .cloned())
    }

    async fn load_list(&self, list_id: ListId) -> Result<Option<List>, RepositoryError> {
        Ok(self.lists.read().await.get(&list_id).cloned())
    }

    async fn list_ids(
        &self,
        after: Option<ListId>,
        limit: usize,
    ) -> Result<Vec<ListId>, RepositoryError> {
        let lists = self.lists.read().await;
        Ok(lists
            .keys()
            .filter(|id| after.is_none_or(|after| **id > after))
            .take(limit)
            .copied()
            .collect())
    }

    async fn rename_list(&self, list_id: ListId, name: &str) -> Result<(), RepositoryError> {
        let mut lists = self.lists.write().await;
        let list = lists
            .get_mut(&list_id)
            .ok_or(RepositoryError::ListNotFound(list_id))?;
        name.clone_into(&mut list.name);
        list.updated_at = Utc::now();
        Ok(())
    }

    async fn delete_list(&self, list_id: ListId, user_id: UserId) -> Result<bool, RepositoryError> {
        let mut lists = self.lists.write().await;
        let owned = lists
            .get(&list_id)
            .is_some_and(|list| list.user_id == user_id);
        if owned {
            lists.remove(&list_id);
        }
        Ok(owned)
    }

    async fn insert_item(
        &self,
        list_id: ListId,
        item: NewItem,
        position: i32,
    ) -> Result<ListItem, RepositoryError> {
        let mut lists = self.lists.write().await;
        let list = lists
            .get_mut(&list_id)
            .ok_or(RepositoryError::ListNotFound(list_id))?;
        let id = ItemId::new(self.next_item_id.fetch_add(1, Ordering::Relaxed));
        let item = ListItem::new(id, list_id, item.title, item.description, position);
        list.items.push(item.clone());
        list.updated_at = Utc::now();
        Ok(item)
    }

    async fn put_item(&self, item: &ListItem) -> Result<(), RepositoryError> {
        let mut lists = self.lists.write().await;
        if !lists.contains_key(&item.list_id) {
            return Err(RepositoryError::ListNotFound(item.list_id));
        }

        for list in lists.values_mut() {
            list.take_item(item.id);
        }
        let target = lists
            .get_mut(&item.list_id)
            .ok_or(RepositoryError::ListNotFound(item.list_id))?;
        target.items.push(item.clone());
        target.items.sort_by_key(|stored| (stored.position, stored.id));
        target.updated_at = Utc::now();

        self.next_item_id
            .fetch_max(item.id.get().saturating_add(1), Ordering::Relaxed);
        Ok(())
    }

    async fn delete_item(&self, list_id: ListId, item_id: ItemId) -> Result<bool, RepositoryError> {
        let mut lists = self.lists.write().await;
        let Some(list) = lists.get_mut(&list_id) else {
            return Ok(false);
        };
        let removed = list.take_item(item_id).is_some();
        Ok(removed)
    }

    async fn count_items(&self, list_id: ListId) -> Result<i32, RepositoryError> {
        let lists = self.lists.read().await;
        let count = lists.get(&list_id).map_or(0, |list| list.items.len());
        Ok(i32::try_from(count).unwrap_or(i32::MAX))
    }

    async fn set_item_count(&self, list_id: ListId, count: i32) -> Result<(), RepositoryError> {
        let mut lists = self.lists.write().await;
        let list = lists
            .get_mut(&list_id)
            .ok_or(RepositoryError::ListNotFound(list_id))?;
        list.item_count = count;
        Ok(())
    }
}
