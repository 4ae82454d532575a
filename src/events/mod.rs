//! Domain event pipeline: topics, envelopes, and the publish/subscribe bus.
//!
//! # Event flow
//!
//! 1. A producing service (e.g. [`crate::service::ListService`]) commits a
//!    mutation, then publishes on a [`Topic`].
//! 2. [`EventBus`] fans the [`Envelope`] out to every channel registered
//!    for that topic.
//! 3. Each [`crate::processors`] loop consumes its channel and runs one
//!    application service call per envelope.
//!
//! Delivery is best-effort: no durability, no replay, no ordering across
//! topics.

pub mod bus;
pub mod envelope;
pub mod topic;

pub use bus::EventBus;
pub use envelope::{Envelope, Payload};
pub use topic::Topic;
