//! In-memory search index.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{ListDocument, SearchClient, SearchError};

/// [`SearchClient`] that keeps documents in a map keyed by object ID.
///
/// Used when no search service is configured, and by tests to observe
/// what the projection pushed.
#[derive(Debug, Default)]
pub struct InMemorySearchClient {
    documents: RwLock<HashMap<String, ListDocument>>,
}

impl InMemorySearchClient {
    /// Creates an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the document stored under `object_id`.
    pub async fn document(&self, object_id: &str) -> Option<ListDocument> {
        self.documents.read().await.get(object_id).cloned()
    }

    /// Number of indexed documents.
    pub async fn len(&self) -> usize {
        self.documents.read().await.len()
    }

    /// Returns `true` if nothing is indexed.
    pub async fn is_empty(&self) -> bool {
        self.documents.read().await.is_empty()
    }
}

#[async_trait]
impl SearchClient for InMemorySearchClient {
    async fn save_objects(&self, documents: &[ListDocument]) -> Result<(), SearchError> {
        let mut index = self.documents.write().await;
        for document in documents {
            index.insert(document.object_id.clone(), document.clone());
        }
        Ok(())
    }

    async fn delete_object(&self, object_id: &str) -> Result<(), SearchError> {
        self.documents.write().await.remove(object_id);
        Ok(())
    }
}
