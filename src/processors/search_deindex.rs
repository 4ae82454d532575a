//! Search-index delete handler.

use async_trait::async_trait;

use super::{EventHandler, list_payload};
use crate::events::{Payload, Topic};
use crate::service::{ProjectionError, SearchIndexService};

/// Removes the search document of a deleted list.
#[derive(Debug, Clone)]
pub struct DeindexList {
    service: SearchIndexService,
}

impl DeindexList {
    /// Creates the handler.
    #[must_use]
    pub fn new(service: SearchIndexService) -> Self {
        Self { service }
    }
}

#[async_trait]
impl EventHandler for DeindexList {
    fn name(&self) -> &'static str {
        "search_deindex"
    }

    fn forwards_failures(&self) -> bool {
        true
    }

    async fn handle(&self, topic: Topic, payload: &Payload) -> Result<(), ProjectionError> {
        let list_id = list_payload(topic, payload)?;
        self.service.remove_list(list_id).await
    }
}
