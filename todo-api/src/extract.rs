/// Request extractors
///
/// Wrappers around axum's `Json`, `Path` and `Query` that reject with
/// [`ApiError`] instead of axum's plain-text rejections, plus [`OwnerScope`],
/// which checks the `{user_id}` path segment against the authenticated
/// caller before the handler reads a body.

use std::collections::HashMap;

use axum::{
    async_trait,
    extract::{FromRequest, FromRequestParts, Path},
    http::request::Parts,
};
use todo_shared::auth::{authorization::require_path_user, guard::AuthContext};
use uuid::Uuid;

use crate::error::ApiError;

/// `Json` that rejects with a `VALIDATION_ERROR` envelope
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct AppJson<T>(pub T);

/// `Path` that rejects with a `VALIDATION_ERROR` envelope
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub struct AppPath<T>(pub T);

/// `Query` that rejects with a `VALIDATION_ERROR` envelope
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct AppQuery<T>(pub T);

/// Authenticated caller whose id matches the `{user_id}` path segment
///
/// Rejects with 401 when the auth middleware did not run or found no caller,
/// 400 when `user_id` is not a UUID and 403 when it names someone else.
#[derive(Debug, Clone, Copy)]
pub struct OwnerScope {
    pub user_id: Uuid,
}

#[async_trait]
impl<S> FromRequestParts<S> for OwnerScope
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let caller = parts
            .extensions
            .get::<AuthContext>()
            .copied()
            .ok_or_else(|| ApiError::Unauthorized("Not authenticated".to_string()))?;

        let Path(params) = Path::<HashMap<String, String>>::from_request_parts(parts, state).await?;

        let path_user = params
            .get("user_id")
            .ok_or_else(|| ApiError::InternalError("Route has no user_id segment".to_string()))?;
        let path_user = Uuid::parse_str(path_user)
            .map_err(|_| ApiError::invalid("user_id", "user_id must be a valid UUID"))?;

        require_path_user(caller.user_id, path_user)?;

        Ok(Self {
            user_id: caller.user_id,
        })
    }
}
