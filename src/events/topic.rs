//! Event topics.

use std::fmt;

/// Routing key of a domain event.
///
/// The set is closed: every producer and subscriber in the process agrees
/// on these names, and each topic implies the [`super::Payload`] variant it
/// carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topic {
    /// A list was created. Carries [`super::Payload::List`].
    ListCreated,
    /// A list or its items changed. Carries [`super::Payload::List`].
    ListUpdated,
    /// A list was deleted. Carries [`super::Payload::List`].
    ListDeleted,
    /// A full search reindex was requested. Carries [`super::Payload::Empty`].
    IndexAllListsRequested,
}

impl Topic {
    /// Every topic, in declaration order.
    pub const ALL: [Self; 4] = [
        Self::ListCreated,
        Self::ListUpdated,
        Self::ListDeleted,
        Self::IndexAllListsRequested,
    ];

    /// Returns the stable string name of the topic.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ListCreated => "listCreated",
            Self::ListUpdated => "listUpdated",
            Self::ListDeleted => "listDeleted",
            Self::IndexAllListsRequested => "indexAllListsRequested",
        }
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_stable() {
        let names: Vec<&str> = Topic::ALL.iter().map(|t| t.as_str()).collect();
        assert_eq!(
            names,
            ["listCreated", "listUpdated", "listDeleted", "indexAllListsRequested"]
        );
    }

    #[test]
    fn display_matches_as_str() {
        assert_eq!(Topic::ListDeleted.to_string(), "listDeleted");
    }
}
