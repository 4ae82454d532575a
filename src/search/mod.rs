//! Search indexing collaborator.
//!
//! The rest of the crate talks to the search engine only through
//! [`SearchClient`]: push denormalised [`ListDocument`]s, or delete one by
//! object ID. [`algolia::AlgoliaSearchClient`] speaks an Algolia-style REST
//! API; [`memory::InMemorySearchClient`] keeps documents in a map.

pub mod algolia;
pub mod document;
pub mod memory;

use async_trait::async_trait;

pub use algolia::{AlgoliaConfig, AlgoliaSearchClient};
pub use document::{ItemDocument, ListDocument};
pub use memory::InMemorySearchClient;

/// Failure reported by a [`SearchClient`].
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    /// Transport-level or non-success HTTP response.
    #[error("search request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The search service rejected the request.
    #[error("search service rejected request ({status}): {body}")]
    Rejected {
        /// HTTP status code returned by the service.
        status: u16,
        /// Response body, for diagnostics.
        body: String,
    },

    /// Client-side configuration is unusable.
    #[error("search client misconfigured: {0}")]
    Config(String),
}

/// Narrow interface to the external search-indexing service.
#[async_trait]
pub trait SearchClient: std::fmt::Debug + Send + Sync {
    /// Creates or fully replaces the given documents, keyed by object ID.
    async fn save_objects(&self, documents: &[ListDocument]) -> Result<(), SearchError>;

    /// Removes the document with the given object ID. Deleting an absent
    /// document succeeds.
    async fn delete_object(&self, object_id: &str) -> Result<(), SearchError>;
}
