//! Request extractors.
//!
//! Identity arrives as headers set by the fronting auth proxy: `X-User-Id`
//! (UUID) and `X-User-Role` (student/teacher/admin). The API trusts these
//! headers; verifying them is the proxy's job.

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use lectio_core::{AuthPrincipal, Role};
use uuid::Uuid;

use crate::ApiError;

/// Header carrying the authenticated user's UUID.
pub const USER_ID_HEADER: &str = "x-user-id";

/// Header carrying the authenticated user's role.
pub const USER_ROLE_HEADER: &str = "x-user-role";

/// Extracts the caller's [`AuthPrincipal`] from identity headers.
/// Rejects with 401 when either header is missing or malformed.
pub struct Principal(pub AuthPrincipal);

#[async_trait]
impl<S> FromRequestParts<S> for Principal
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user_id = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| Uuid::parse_str(v).ok())
            .ok_or_else(|| {
                ApiError::Unauthorized("missing or invalid X-User-Id header".to_string())
            })?;

        let role: Role = parts
            .headers
            .get(USER_ROLE_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse().ok())
            .ok_or_else(|| {
                ApiError::Unauthorized("missing or invalid X-User-Role header".to_string())
            })?;

        Ok(Principal(AuthPrincipal::new(user_id, role)))
    }
}

/// Shared guard for endpoints restricted to teachers and admins.
pub fn require_privileged(principal: &AuthPrincipal) -> Result<(), ApiError> {
    if principal.role.is_privileged() {
        Ok(())
    } else {
        Err(ApiError::Forbidden(
            "this operation requires a teacher or admin role".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{Request, StatusCode};
    use axum::response::IntoResponse;

    async fn extract(headers: &[(&str, &str)]) -> Result<Principal, ApiError> {
        let mut builder = Request::builder().uri("/");
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        let (mut parts, _) = builder.body(()).unwrap().into_parts();
        Principal::from_request_parts(&mut parts, &()).await
    }

    #[tokio::test]
    async fn test_missing_identity_rejects_with_401() {
        let err = extract(&[]).await.err().unwrap();
        assert_eq!(err.into_response().status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_malformed_user_id_rejects_with_401() {
        let err = extract(&[(USER_ID_HEADER, "not-a-uuid"), (USER_ROLE_HEADER, "admin")])
            .await
            .err()
            .unwrap();
        assert_eq!(err.into_response().status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_valid_headers_extract_principal() {
        let id = Uuid::now_v7();
        let id_str = id.to_string();
        let Principal(principal) = extract(&[
            (USER_ID_HEADER, id_str.as_str()),
            (USER_ROLE_HEADER, "teacher"),
        ])
        .await
        .unwrap();
        assert_eq!(principal.user_id, id);
        assert!(principal.role.is_privileged());
    }
}
