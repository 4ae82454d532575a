//! Application error types with HTTP status code mapping.
//!
//! [`AppError`] is returned by producing services and surfaced to HTTP
//! callers. Each variant maps to a status code and a structured JSON body.
//! Failures inside the asynchronous pipeline never become an `AppError`;
//! see [`crate::service::ProjectionError`].

use std::error::Error as StdError;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

/// Structured JSON error response body.
///
/// All error responses follow this shape:
/// ```json
/// {
///   "error": {
///     "code": 1001,
///     "message": "bad request: destination list 12 does not exist"
///   }
/// }
/// ```
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Structured error payload.
    pub error: ErrorBody,
}

/// Inner error body with numeric code and human-readable message.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Numeric error code.
    pub code: u32,
    /// Human-readable error message.
    pub message: String,
    /// Optional additional details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Server-side error enum with HTTP status code mapping.
///
/// # Error Code Ranges
///
/// | Range     | Category      | HTTP Status               |
/// |-----------|---------------|---------------------------|
/// | 1000–1999 | Caller error  | 400 Bad Request           |
/// | 2000–2999 | Not found     | 404 Not Found             |
/// | 3000–3999 | Server        | 500 Internal Server Error |
/// | 4000–4999 | Identity      | 401 Unauthorized          |
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Caller-correctable request problem.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// The addressed resource does not exist for this caller.
    #[error("not found: {0}")]
    NotFound(String),

    /// The caller could not be identified.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Infrastructure or storage failure.
    #[error("unexpected error while {context}")]
    Unexpected {
        /// What the service was doing when the failure occurred.
        context: String,
        /// Underlying cause.
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },
}

impl AppError {
    /// Wraps an infrastructure failure with a description of the step
    /// that failed.
    pub fn unexpected(
        context: impl Into<String>,
        source: impl Into<Box<dyn StdError + Send + Sync>>,
    ) -> Self {
        Self::Unexpected {
            context: context.into(),
            source: source.into(),
        }
    }

    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::BadRequest(_) => 1001,
            Self::NotFound(_) => 2001,
            Self::Unexpected { .. } => 3000,
            Self::Unauthorized(_) => 4001,
        }
    }

    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Unexpected { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if let Self::Unexpected { context, source } = &self {
            tracing::error!(context = %context, error = %source, "request failed");
        }
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.error_code(),
                message: self.to_string(),
                details: None,
            },
        };
        let mut response = axum::Json(body).into_response();
        *response.status_mut() = status;
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::RepositoryError;

    #[test]
    fn status_codes() {
        assert_eq!(
            AppError::BadRequest("x".to_string()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::NotFound("x".to_string()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::Unauthorized("x".to_string()).status_code(),
            StatusCode::UNAUTHORIZED
        );
    }

    #[test]
    fn unexpected_hides_cause_in_message_but_keeps_source() {
        let err = AppError::unexpected(
            "saving list 11",
            RepositoryError::Unavailable("connection reset".to_string()),
        );
        assert_eq!(err.to_string(), "unexpected error while saving list 11");
        assert!(err.source().is_some());
        assert_eq!(err.error_code(), 3000);
    }

    #[test]
    fn response_carries_status() {
        let response = AppError::BadRequest("nope".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
