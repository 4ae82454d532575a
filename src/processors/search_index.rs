//! Search-index upsert handlers.

use async_trait::async_trait;

use super::{EventHandler, list_payload};
use crate::events::{Payload, Topic};
use crate::service::{ProjectionError, SearchIndexService};

/// Re-reads a list and pushes its search document.
#[derive(Debug, Clone)]
pub struct IndexList {
    service: SearchIndexService,
}

impl IndexList {
    /// Creates the handler.
    #[must_use]
    pub fn new(service: SearchIndexService) -> Self {
        Self { service }
    }
}

#[async_trait]
impl EventHandler for IndexList {
    fn name(&self) -> &'static str {
        "search_index"
    }

    fn forwards_failures(&self) -> bool {
        true
    }

    async fn handle(&self, topic: Topic, payload: &Payload) -> Result<(), ProjectionError> {
        let list_id = list_payload(topic, payload)?;
        self.service.index_list(list_id).await
    }
}

/// Rebuilds every search document in batches.
///
/// The recovery path for projections that drifted after failed events.
#[derive(Debug, Clone)]
pub struct IndexAllLists {
    service: SearchIndexService,
    batch_size: usize,
}

impl IndexAllLists {
    /// Creates the handler, pushing `batch_size` documents per request.
    #[must_use]
    pub fn new(service: SearchIndexService, batch_size: usize) -> Self {
        Self {
            service,
            batch_size,
        }
    }
}

#[async_trait]
impl EventHandler for IndexAllLists {
    fn name(&self) -> &'static str {
        "search_reindex"
    }

    fn forwards_failures(&self) -> bool {
        true
    }

    async fn handle(&self, topic: Topic, payload: &Payload) -> Result<(), ProjectionError> {
        if *payload != Payload::Empty {
            return Err(ProjectionError::UnexpectedPayload {
                topic,
                payload: *payload,
            });
        }
        self.service.index_all(self.batch_size).await?;
        Ok(())
    }
}
