//! Request extractors.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::domain::UserId;
use crate::error::AppError;

/// Header carrying the authenticated caller's user ID.
pub const USER_ID_HEADER: &str = "x-user-id";

/// Caller identity, taken from the `X-User-Id` header.
///
/// Authentication happens upstream; this only parses what the
/// authenticating proxy forwarded. A missing, non-numeric, or
/// non-positive value is rejected with [`AppError::Unauthorized`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthUser(pub UserId);

impl<S: Send + Sync> FromRequestParts<S> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let raw = parts
            .headers
            .get(USER_ID_HEADER)
            .ok_or_else(|| AppError::Unauthorized("missing X-User-Id header".to_string()))?;
        raw.to_str()
            .ok()
            .and_then(|value| value.trim().parse::<i32>().ok())
            .filter(|id| *id > 0)
            .map(|id| Self(UserId::new(id)))
            .ok_or_else(|| AppError::Unauthorized("invalid X-User-Id header".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use axum::http::Request;

    use super::*;

    async fn extract(header: Option<&str>) -> Result<AuthUser, AppError> {
        let mut builder = Request::builder().uri("/");
        if let Some(value) = header {
            builder = builder.header(USER_ID_HEADER, value);
        }
        let (mut parts, ()) = builder.body(()).unwrap_or_default().into_parts();
        AuthUser::from_request_parts(&mut parts, &()).await
    }

    #[tokio::test]
    async fn parses_positive_id() {
        let user = extract(Some(" 42 ")).await;
        assert!(matches!(user, Ok(AuthUser(id)) if id == UserId::new(42)));
    }

    #[tokio::test]
    async fn rejects_missing_and_invalid() {
        for header in [None, Some("abc"), Some("0"), Some("-1")] {
            assert!(matches!(
                extract(header).await,
                Err(AppError::Unauthorized(_))
            ));
        }
    }
}
