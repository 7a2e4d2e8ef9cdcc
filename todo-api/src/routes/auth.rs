/// Authentication endpoints
///
/// - `POST /api/auth/register`: create an account and sign in
/// - `POST /api/auth/login`: exchange email/password for an access token
/// - `GET /api/auth/me`: the authenticated user's profile
/// - `POST /api/auth/logout`: drop the auth cookie
///
/// Register and login return the token in the body and also set it as an
/// httpOnly `access_token` cookie, so browser clients need no token storage.

use axum::{extract::State, http::header, Extension};
use serde::{Deserialize, Serialize};
use todo_shared::{
    auth::guard::{clear_session_cookie, session_cookie, AuthContext},
    models::user::{User, UserProfile},
};
use validator::Validate;

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    extract::AppJson,
    response::ApiResponse,
};

/// Register request
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
}

/// Login request
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Token payload returned by register and login
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,

    /// Always `"bearer"`
    pub token_type: String,
}

/// Logout payload
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Response carrying a `Set-Cookie` header alongside the envelope
type WithCookie<T> = ([(header::HeaderName, String); 1], ApiResponse<T>);

/// Register a new user
///
/// # Errors
///
/// - `400`: malformed email or password shorter than 8 characters
/// - `409`: email already registered
pub async fn register(
    State(state): State<AppState>,
    AppJson(req): AppJson<RegisterRequest>,
) -> ApiResult<WithCookie<TokenResponse>> {
    req.validate()?;

    let user = state.users.register(&req.email, &req.password).await?;
    let (cookie, body) = sign_in(&state, &user)?;

    Ok(([(header::SET_COOKIE, cookie)], ApiResponse::created(body)))
}

/// Log in with email and password
///
/// Unknown email and wrong password produce the same `401`.
pub async fn login(
    State(state): State<AppState>,
    AppJson(req): AppJson<LoginRequest>,
) -> ApiResult<WithCookie<TokenResponse>> {
    let user = state
        .users
        .authenticate(&req.email, &req.password)
        .await?
        .ok_or(ApiError::InvalidCredentials)?;

    let (cookie, body) = sign_in(&state, &user)?;

    Ok(([(header::SET_COOKIE, cookie)], ApiResponse::ok(body)))
}

/// Current user's profile
///
/// A valid token whose subject no longer exists is treated as unauthenticated.
pub async fn me(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<ApiResponse<UserProfile>> {
    let user = state
        .users
        .find_by_id(auth.user_id)
        .await?
        .ok_or_else(|| {
            tracing::warn!(user_id = %auth.user_id, "Token subject does not exist");
            ApiError::Unauthorized("Could not validate credentials".to_string())
        })?;

    Ok(ApiResponse::ok(UserProfile::from(user)))
}

/// Clear the auth cookie
///
/// Tokens are stateless, so an already-issued bearer token stays valid until
/// it expires.
pub async fn logout(State(state): State<AppState>) -> WithCookie<MessageResponse> {
    let cookie = clear_session_cookie(state.config.api.cookie_secure);

    (
        [(header::SET_COOKIE, cookie)],
        ApiResponse::ok(MessageResponse {
            message: "Logged out".to_string(),
        }),
    )
}

/// Issues a token for `user` and builds the matching cookie
fn sign_in(state: &AppState, user: &User) -> ApiResult<(String, TokenResponse)> {
    let access_token = state.tokens.issue(user.id, None)?;
    let cookie = session_cookie(
        &access_token,
        state.tokens.default_ttl(),
        state.config.api.cookie_secure,
    );

    Ok((
        cookie,
        TokenResponse {
            access_token,
            token_type: "bearer".to_string(),
        },
    ))
}
