//! Persistence layer: the list repository and its implementations.
//!
//! [`ListRepository`] is the storage seam used by both producing services
//! and projection services. [`postgres::PostgresListRepository`] backs
//! production deployments; [`memory::InMemoryListRepository`] backs tests
//! and database-less runs.

pub mod memory;
pub mod models;
pub mod postgres;

use async_trait::async_trait;

use crate::domain::{ItemId, List, ListId, ListItem, UserId};

pub use memory::InMemoryListRepository;
pub use postgres::PostgresListRepository;

/// Storage failure reported by a [`ListRepository`].
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    /// Error returned by the database driver.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A write targeted a list that is not stored.
    #[error("list {0} not found")]
    ListNotFound(ListId),

    /// Backend is unreachable or refused the operation.
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// Fields of an item about to be inserted.
#[derive(Debug, Clone)]
pub struct NewItem {
    /// Short title.
    pub title: String,
    /// Free-form description.
    pub description: String,
}

/// CRUD over list aggregates, keyed by list ID and owner.
///
/// Methods taking a [`UserId`] are scoped to that owner and behave as if
/// lists of other users did not exist. Unscoped reads are reserved for
/// projection services, which act on behalf of the system.
#[async_trait]
pub trait ListRepository: std::fmt::Debug + Send + Sync {
    /// Inserts a new, empty list owned by `user_id`.
    async fn create_list(&self, user_id: UserId, name: &str) -> Result<List, RepositoryError>;

    /// Loads a list with its items, scoped to `user_id`.
    async fn find_list(
        &self,
        list_id: ListId,
        user_id: UserId,
    ) -> Result<Option<List>, RepositoryError>;

    /// Loads a list with its items regardless of owner.
    async fn load_list(&self, list_id: ListId) -> Result<Option<List>, RepositoryError>;

    /// Returns up to `limit` list IDs greater than `after`, ascending.
    async fn list_ids(
        &self,
        after: Option<ListId>,
        limit: usize,
    ) -> Result<Vec<ListId>, RepositoryError>;

    /// Changes the name of a list, leaving its items untouched.
    ///
    /// Fails with [`RepositoryError::ListNotFound`] when the list row does
    /// not exist.
    async fn rename_list(&self, list_id: ListId, name: &str) -> Result<(), RepositoryError>;

    /// Deletes a list and its items. Returns `false` when nothing matched.
    async fn delete_list(&self, list_id: ListId, user_id: UserId) -> Result<bool, RepositoryError>;

    /// Appends a new item to a list at `position`.
    async fn insert_item(
        &self,
        list_id: ListId,
        item: NewItem,
        position: i32,
    ) -> Result<ListItem, RepositoryError>;

    /// Stores an existing item under `item.list_id` at `item.position`.
    ///
    /// An item belongs to exactly one list: if it is stored elsewhere it is
    /// moved, otherwise it is inserted with its own ID. Other items of
    /// either list are not touched. Fails with
    /// [`RepositoryError::ListNotFound`] when the target list does not
    /// exist.
    async fn put_item(&self, item: &ListItem) -> Result<(), RepositoryError>;

    /// Deletes one item of a list. Returns `false` when nothing matched.
    async fn delete_item(&self, list_id: ListId, item_id: ItemId) -> Result<bool, RepositoryError>;

    /// Counts the items currently stored under `list_id`.
    async fn count_items(&self, list_id: ListId) -> Result<i32, RepositoryError>;

    /// Stores the projected item count of a list.
    ///
    /// Fails with [`RepositoryError::ListNotFound`] when the list row does
    /// not exist.
    async fn set_item_count(&self, list_id: ListId, count: i32) -> Result<(), RepositoryError>;
}
