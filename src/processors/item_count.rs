//! Item-count recalculation handler.

use async_trait::async_trait;

use super::{EventHandler, list_payload};
use crate::events::{Payload, Topic};
use crate::service::{ItemCountService, ProjectionError};

/// Recomputes the stored item count of the list named by the event.
///
/// Failures are logged only.
#[derive(Debug, Clone)]
pub struct RecalculateItemCount {
    service: ItemCountService,
}

impl RecalculateItemCount {
    /// Creates the handler.
    #[must_use]
    pub fn new(service: ItemCountService) -> Self {
        Self { service }
    }
}

#[async_trait]
impl EventHandler for RecalculateItemCount {
    fn name(&self) -> &'static str {
        "item_count"
    }

    async fn handle(&self, topic: Topic, payload: &Payload) -> Result<(), ProjectionError> {
        let list_id = list_payload(topic, payload)?;
        self.service.recalculate(list_id).await?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::domain::UserId;
    use crate::persistence::{InMemoryListRepository, ListRepository, NewItem};

    #[tokio::test]
    async fn updates_count_and_does_not_forward() {
        let repo = Arc::new(InMemoryListRepository::new());
        let Ok(list) = repo.create_list(UserId::new(1), "todo").await else {
            panic!("create failed");
        };
        let item = NewItem {
            title: "a".to_string(),
            description: String::new(),
        };
        let _ = repo.insert_item(list.id, item, 0).await;

        let handler = RecalculateItemCount::new(ItemCountService::new(
            Arc::clone(&repo) as Arc<dyn ListRepository>
        ));
        assert!(!handler.forwards_failures());
        tokio_test::assert_ok!(handler.handle(Topic::ListUpdated, &Payload::List(list.id)).await);

        let Ok(Some(stored)) = repo.load_list(list.id).await else {
            panic!("load failed");
        };
        assert_eq!(stored.item_count, 1);
    }

    #[tokio::test]
    async fn rejects_empty_payload() {
        let repo: Arc<dyn ListRepository> = Arc::new(InMemoryListRepository::new());
        let handler = RecalculateItemCount::new(ItemCountService::new(repo));
        let result = handler.handle(Topic::ListUpdated, &Payload::Empty).await;
        assert!(matches!(result, Err(ProjectionError::UnexpectedPayload { .. })));
    }
}
