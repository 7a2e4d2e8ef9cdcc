/// Authentication middleware
///
/// Resolves the caller from the `Authorization: Bearer` header (or the
/// `access_token` cookie when no Bearer header is present) and inserts an
/// [`AuthContext`] into the request extensions. Requests without a valid
/// credential stop here with a 401 envelope.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use todo_shared::auth::guard::{resolve_caller, AuthContext};

use crate::{app::AppState, error::ApiError};

/// Requires a valid access token
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let caller: AuthContext = resolve_caller(req.headers(), &state.tokens).map_err(|e| {
        tracing::debug!(reason = %e, path = %req.uri().path(), "Rejected unauthenticated request");
        ApiError::from(e)
    })?;

    req.extensions_mut().insert(caller);

    Ok(next.run(req).await)
}
