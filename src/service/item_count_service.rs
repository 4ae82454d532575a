//! Item count projection.

use std::sync::Arc;

use super::ProjectionError;
use crate::domain::ListId;
use crate::persistence::ListRepository;

/// Keeps `List::item_count` in line with the stored items.
#[derive(Debug, Clone)]
pub struct ItemCountService {
    repository: Arc<dyn ListRepository>,
}

impl ItemCountService {
    /// Creates a new `ItemCountService`.
    #[must_use]
    pub fn new(repository: Arc<dyn ListRepository>) -> Self {
        Self { repository }
    }

    /// Recounts the items of `list_id` and stores the result.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectionError::Repository`] if counting or storing
    /// fails, including when the list has been deleted.
    pub async fn recalculate(&self, list_id: ListId) -> Result<i32, ProjectionError> {
        let count = self.repository.count_items(list_id).await?;
        self.repository.set_item_count(list_id, count).await?;
        tracing::debug!(%list_id, count, "item count recalculated");
        Ok(count)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::UserId;
    use crate::persistence::{InMemoryListRepository, NewItem};

    #[tokio::test]
    async fn recalculate_stores_current_count() {
        let repo = Arc::new(InMemoryListRepository::new());
        let Ok(list) = repo.create_list(UserId::new(1), "todo").await else {
            panic!("create failed");
        };
        for position in 0..3 {
            let item = NewItem {
                title: format!("t{position}"),
                description: String::new(),
            };
            let _ = repo.insert_item(list.id, item, position).await;
        }

        let service = ItemCountService::new(Arc::clone(&repo) as Arc<dyn ListRepository>);
        let count = tokio_test::assert_ok!(service.recalculate(list.id).await);
        assert_eq!(count, 3);

        let Ok(Some(stored)) = repo.load_list(list.id).await else {
            panic!("load failed");
        };
        assert_eq!(stored.item_count, 3);
    }

    #[tokio::test]
    async fn deleted_list_is_an_error() {
        let repo: Arc<dyn ListRepository> = Arc::new(InMemoryListRepository::new());
        let service = ItemCountService::new(repo);
        let result = service.recalculate(ListId::new(99)).await;
        assert!(matches!(result, Err(ProjectionError::Repository(_))));
    }
}
