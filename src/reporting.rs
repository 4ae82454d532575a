//! Error reporting collaborator.
//!
//! Failures absorbed by the asynchronous pipeline never reach a caller.
//! Processors that forward failures hand them to an [`ErrorReporter`] so
//! they still end up somewhere an operator looks.

use std::error::Error;

/// Fire-and-forget sink for failures nobody else will see.
pub trait ErrorReporter: std::fmt::Debug + Send + Sync {
    /// Records `error`, raised while doing `context`. Must not block.
    fn notify(&self, context: &str, error: &(dyn Error + 'static));
}

/// Reporter that emits an `error`-level tracing event with the full
/// source chain.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReporter;

impl ErrorReporter for TracingReporter {
    fn notify(&self, context: &str, error: &(dyn Error + 'static)) {
        tracing::error!(
            target: "listhub::error_report",
            context,
            error = %error,
            chain = %source_chain(error),
            "pipeline failure reported"
        );
    }
}

/// Renders `error` and its sources as `outer: inner: root`.
#[must_use]
pub fn source_chain(error: &(dyn Error + 'static)) -> String {
    let mut rendered = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        rendered.push_str(": ");
        rendered.push_str(&cause.to_string());
        source = cause.source();
    }
    rendered
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ListId;
    use crate::persistence::RepositoryError;
    use crate::service::ProjectionError;

    #[test]
    fn chain_includes_sources() {
        let error = ProjectionError::Repository(RepositoryError::ListNotFound(ListId::new(4)));
        assert_eq!(
            source_chain(&error),
            "repository error: list 4 not found: list 4 not found"
        );
    }

    #[test]
    fn tracing_reporter_does_not_panic() {
        let error = RepositoryError::Unavailable("down".to_string());
        TracingReporter.notify("test", &error);
    }
}
