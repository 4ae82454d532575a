//! PostgreSQL implementation of the list repository.

use async_trait::async_trait;
use sqlx::PgPool;

use super::models::{ItemRow, ListRow, item_from_row, list_from_rows};
use super::{ListRepository, NewItem, RepositoryError};
use crate::domain::{ItemId, List, ListId, ListItem, UserId};

/// PostgreSQL-backed [`ListRepository`] using `sqlx::PgPool`.
#[derive(Debug, Clone)]
pub struct PostgresListRepository {
    pool: PgPool,
}

impl PostgresListRepository {
    /// Creates a repository over the given connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Applies the embedded schema migrations.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::Unavailable`] if a migration fails.
    pub async fn migrate(&self) -> Result<(), RepositoryError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| RepositoryError::Unavailable(format!("migration failed: {e}")))
    }

    async fn load_items(&self, list_id: ListId) -> Result<Vec<ItemRow>, RepositoryError> {
        let rows = sqlx::query_as::<_, ItemRow>(
            "SELECT id, list_id, title, description, position, created_at, updated_at \
             FROM list_items WHERE list_id = $1 ORDER BY position ASC, id ASC",
        )
        .bind(list_id.get())
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn with_items(&self, row: Option<ListRow>) -> Result<Option<List>, RepositoryError> {
        let Some(row) = row else {
            return Ok(None);
        };
        let items = self.load_items(ListId::new(row.0)).await?;
        Ok(Some(list_from_rows(row, items)))
    }
}

#[async_trait]
impl ListRepository for PostgresListRepository {
    async fn create_list(&self, user_id: UserId, name: &str) -> Result<List, RepositoryError> {
        let row = sqlx::query_as::<_, ListRow>(
            "INSERT INTO lists (user_id, name) VALUES ($1, $2) \
             RETURNING id, user_id, name, item_count, created_at, updated_at",
        )
        .bind(user_id.get())
        .bind(name)
        .fetch_one(&self.pool)
        .await?;
        Ok(list_from_rows(row, Vec::new()))
    }

    async fn find_list(
        &self,
        list_id: ListId,
        user_id: UserId,
    ) -> Result<Option<List>, RepositoryError> {
        let row = sqlx::query_as::<_, ListRow>(
            "SELECT id, user_id, name, item_count, created_at, updated_at \
             FROM lists WHERE id = $1 AND user_id = $2",
        )
        .bind(list_id.get())
        .bind(user_id.get())
        .fetch_optional(&self.pool)
        .await?;
        self.with_items(row).await
    }

    async fn load_list(&self, list_id: ListId) -> Result<Option<List>, RepositoryError> {
        let row = sqlx::query_as::<_, ListRow>(
            "SELECT id, user_id, name, item_count, created_at, updated_at \
             FROM lists WHERE id = $1",
        )
        .bind(list_id.get())
        .fetch_optional(&self.pool)
        .await?;
        self.with_items(row).await
    }

    async fn list_ids(
        &self,
        after: Option<ListId>,
        limit: usize,
    ) -> Result<Vec<ListId>, RepositoryError> {
        let ids = sqlx::query_scalar::<_, i32>(
            "SELECT id FROM lists WHERE id > $1 ORDER BY id ASC LIMIT $2",
        )
        .bind(after.map_or(i32::MIN, ListId::get))
        .bind(i64::try_from(limit).unwrap_or(i64::MAX))
        .fetch_all(&self.pool)
        .await?;
        Ok(ids.into_iter().map(ListId::new).collect())
    }

    async fn rename_list(&self, list_id: ListId, name: &str) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE lists SET name = $1, updated_at = now() WHERE id = $2")
            .bind(name)
            .bind(list_id.get())
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::ListNotFound(list_id));
        }
        Ok(())
    }

    async fn delete_list(&self, list_id: ListId, user_id: UserId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM lists WHERE id = $1 AND user_id = $2")
            .bind(list_id.get())
            .bind(user_id.get())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn insert_item(
        &self,
        list_id: ListId,
        item: NewItem,
        position: i32,
    ) -> Result<ListItem, RepositoryError> {
        let row = sqlx::query_as::<_, ItemRow>(
            "INSERT INTO list_items (list_id, title, description, position) VALUES ($1, $2, $3, $4) \
             RETURNING id, list_id, title, description, position, created_at, updated_at",
        )
        .bind(list_id.get())
        .bind(&item.title)
        .bind(&item.description)
        .bind(position)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| missing_list(list_id, e))?;
        Ok(item_from_row(row))
    }

    async fn put_item(&self, item: &ListItem) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO list_items (id, list_id, title, description, position, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, now()) \
             ON CONFLICT (id) DO UPDATE SET list_id = EXCLUDED.list_id, \
             position = EXCLUDED.position, updated_at = now()",
        )
        .bind(item.id.get())
        .bind(item.list_id.get())
        .bind(&item.title)
        .bind(&item.description)
        .bind(item.position)
        .bind(item.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| missing_list(item.list_id, e))?;
        Ok(())
    }

    async fn delete_item(&self, list_id: ListId, item_id: ItemId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM list_items WHERE id = $1 AND list_id = $2")
            .bind(item_id.get())
            .bind(list_id.get())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn count_items(&self, list_id: ListId) -> Result<i32, RepositoryError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM list_items WHERE list_id = $1")
            .bind(list_id.get())
            .fetch_one(&self.pool)
            .await?;
        Ok(i32::try_from(count).unwrap_or(i32::MAX))
    }

    async fn set_item_count(&self, list_id: ListId, count: i32) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE lists SET item_count = $1 WHERE id = $2")
            .bind(count)
            .bind(list_id.get())
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::ListNotFound(list_id));
        }
        Ok(())
    }
}

/// Maps a foreign-key violation on `list_items.list_id` to
/// [`RepositoryError::ListNotFound`].
fn missing_list(list_id: ListId, error: sqlx::Error) -> RepositoryError {
    match error {
        sqlx::Error::Database(ref db) if db.is_foreign_key_violation() => {
            RepositoryError::ListNotFound(list_id)
        }
        other => RepositoryError::Database(other),
    }
}
