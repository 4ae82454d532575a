//! Envelope and payload types carried by the bus.

use std::fmt;

use super::Topic;
use crate::domain::ListId;

/// Data attached to an event.
///
/// One variant per payload shape. Subscribers match on it instead of
/// downcasting, so a producer/subscriber mismatch surfaces as an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Payload {
    /// The event concerns a single list.
    List(ListId),
    /// The event carries no data.
    Empty,
}

impl Payload {
    /// Returns the list ID if this payload carries one.
    #[must_use]
    pub const fn list_id(&self) -> Option<ListId> {
        match self {
            Self::List(id) => Some(*id),
            Self::Empty => None,
        }
    }
}

impl From<ListId> for Payload {
    fn from(id: ListId) -> Self {
        Self::List(id)
    }
}

impl fmt::Display for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::List(id) => write!(f, "list:{id}"),
            Self::Empty => f.write_str("empty"),
        }
    }
}

/// A topic and its payload, as delivered to subscribers.
///
/// Immutable once built. Carries no timestamp or sequence number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    topic: Topic,
    payload: Payload,
}

impl Envelope {
    /// Wraps `payload` for delivery on `topic`.
    #[must_use]
    pub const fn new(topic: Topic, payload: Payload) -> Self {
        Self { topic, payload }
    }

    /// Topic the envelope was published on.
    #[must_use]
    pub const fn topic(&self) -> Topic {
        self.topic
    }

    /// Payload carried by the envelope.
    #[must_use]
    pub const fn payload(&self) -> &Payload {
        &self.payload
    }
}
