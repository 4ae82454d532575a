//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use crate::events::EventBus;
use crate::service::ListService;

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// List service for all mutations and reads.
    pub list_service: Arc<ListService>,
    /// Event bus, exposed for health reporting.
    pub event_bus: EventBus,
}

impl AppState {
    /// Builds the state around `list_service`, sharing its bus.
    #[must_use]
    pub fn new(list_service: ListService) -> Self {
        let event_bus = list_service.event_bus().clone();
        Self {
            list_service: Arc::new(list_service),
            event_bus,
        }
    }
}
