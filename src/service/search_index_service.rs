//! Search index projection.

use std::sync::Arc;

use super::ProjectionError;
use crate::domain::ListId;
use crate::persistence::ListRepository;
use crate::search::{ListDocument, SearchClient};

/// Pushes list aggregates to the search collaborator as documents.
#[derive(Debug, Clone)]
pub struct SearchIndexService {
    repository: Arc<dyn ListRepository>,
    search: Arc<dyn SearchClient>,
}

impl SearchIndexService {
    /// Creates a new `SearchIndexService`.
    #[must_use]
    pub fn new(repository: Arc<dyn ListRepository>, search: Arc<dyn SearchClient>) -> Self {
        Self { repository, search }
    }

    /// Re-reads `list_id` with its items and upserts its document.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectionError::ListNotFound`] if the list is gone, or
    /// the repository/search failure that stopped the upsert.
    pub async fn index_list(&self, list_id: ListId) -> Result<(), ProjectionError> {
        let list = self
            .repository
            .load_list(list_id)
            .await?
            .ok_or(ProjectionError::ListNotFound(list_id))?;
        let document = ListDocument::from(&list);
        self.search.save_objects(std::slice::from_ref(&document)).await?;
        tracing::debug!(%list_id, items = document.items.len(), "list indexed");
        Ok(())
    }

    /// Removes the document of `list_id` from the index.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectionError::Search`] if the delete fails.
    pub async fn remove_list(&self, list_id: ListId) -> Result<(), ProjectionError> {
        self.search
            .delete_object(&ListDocument::object_id_for(list_id))
            .await?;
        tracing::debug!(%list_id, "list removed from index");
        Ok(())
    }

    /// Rebuilds the document of every stored list, `batch_size` lists per
    /// search request. Lists deleted mid-run are skipped.
    ///
    /// Returns the number of documents pushed.
    ///
    /// # Errors
    ///
    /// Stops at the first repository or search failure.
    pub async fn index_all(&self, batch_size: usize) -> Result<usize, ProjectionError> {
        let batch_size = batch_size.max(1);
        let mut after = None;
        let mut indexed = 0usize;

        loop {
            let ids = self.repository.list_ids(after, batch_size).await?;
            let Some(last) = ids.last().copied() else {
                break;
            };

            let mut documents = Vec::with_capacity(ids.len());
            for id in &ids {
                if let Some(list) = self.repository.load_list(*id).await? {
                    documents.push(ListDocument::from(&list));
                }
            }
            self.search.save_objects(&documents).await?;
            indexed = indexed.saturating_add(documents.len());
            tracing::debug!(batch = documents.len(), indexed, "reindex batch pushed");

            if ids.len() < batch_size {
                break;
            }
            after = Some(last);
        }

        tracing::info!(indexed, "full reindex complete");
        Ok(indexed)
    }
}
