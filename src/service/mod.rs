//! Service layer: producing and projection services.
//!
//! [`ListService`] performs list mutations and publishes events through the
//! [`crate::events::EventBus`]. [`ItemCountService`] and
//! [`SearchIndexService`] are the application services processors call to
//! keep projections in step.

pub mod item_count_service;
pub mod list_service;
pub mod search_index_service;

pub use item_count_service::ItemCountService;
pub use list_service::ListService;
pub use search_index_service::SearchIndexService;

use crate::domain::ListId;
use crate::events::{Payload, Topic};
use crate::persistence::RepositoryError;
use crate::search::SearchError;

/// Failure while updating a projection from an event.
///
/// Reported through a processor's completion callback; never returned to
/// the request that caused the event.
#[derive(Debug, thiserror::Error)]
pub enum ProjectionError {
    /// Storage failure.
    #[error("repository error: {0}")]
    Repository(#[from] RepositoryError),

    /// Search service failure.
    #[error("search error: {0}")]
    Search(#[from] SearchError),

    /// The list named by the event no longer exists.
    #[error("list {0} no longer exists")]
    ListNotFound(ListId),

    /// The payload does not have the shape the topic implies.
    #[error("unexpected payload {payload} on topic {topic}")]
    UnexpectedPayload {
        /// Topic the envelope arrived on.
        topic: Topic,
        /// Payload actually received.
        payload: Payload,
    },

    /// The handler panicked while processing the event.
    #[error("handler panicked: {0}")]
    Panicked(String),
}
