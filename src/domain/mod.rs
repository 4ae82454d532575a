//! Domain layer: identifiers and the list aggregate.
//!
//! Lists are owned by a single user and hold ordered items. Every mutation
//! of a list is followed by a domain event on the [`crate::events::EventBus`]
//! so projections (item counts, search documents) can catch up.

pub mod ids;
pub mod list;

pub use ids::{ItemId, ListId, UserId};
pub use list::{List, ListItem};
