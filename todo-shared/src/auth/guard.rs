/// Caller resolution from request credentials
///
/// A request can carry its access token in two places:
///
/// 1. `Authorization: Bearer <token>` header (checked first)
/// 2. The httpOnly `access_token` cookie set by register/login
///
/// The header wins whenever it holds a Bearer credential. A header token that
/// fails verification is rejected outright; the cookie is only consulted when
/// no Bearer header is present.
///
/// # Example
///
/// ```
/// use axum::http::{header, HeaderMap, HeaderValue};
/// use chrono::Duration;
/// use todo_shared::auth::{guard::resolve_caller, jwt::TokenService};
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let tokens = TokenService::new("your-secret-key-at-least-32-bytes!!", Duration::minutes(15));
/// let user_id = Uuid::new_v4();
/// let token = tokens.issue(user_id, None)?;
///
/// let mut headers = HeaderMap::new();
/// headers.insert(header::AUTHORIZATION, HeaderValue::from_str(&format!("Bearer {}", token))?);
///
/// let caller = resolve_caller(&headers, &tokens)?;
/// assert_eq!(caller.user_id, user_id);
/// # Ok(())
/// # }
/// ```

use axum::http::{header, HeaderMap};
use chrono::Duration;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::jwt::TokenService;

/// Name of the cookie holding the access token
pub const AUTH_COOKIE_NAME: &str = "access_token";

/// Authenticated caller, inserted into request extensions by the API layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthContext {
    /// Token subject; the only source of "current user"
    pub user_id: Uuid,
}

impl AuthContext {
    pub fn new(user_id: Uuid) -> Self {
        Self { user_id }
    }
}

/// Error type for caller resolution
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum AuthError {
    /// Neither a Bearer header nor the auth cookie was present
    #[error("Not authenticated")]
    MissingCredentials,

    /// A token was present but failed verification
    #[error("Could not validate credentials")]
    InvalidToken,
}

/// Extracts the raw access token from request headers
///
/// Returns `None` when neither carrier holds a non-empty token.
pub fn extract_token(headers: &HeaderMap) -> Option<String> {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim);

    if let Some(token) = bearer {
        return Some(token.to_string());
    }

    cookie_value(headers, AUTH_COOKIE_NAME)
}

/// Resolves the caller's identity from request headers
///
/// # Errors
///
/// - `AuthError::MissingCredentials` if no token is present
/// - `AuthError::InvalidToken` if the token is expired, malformed or forged
pub fn resolve_caller(headers: &HeaderMap, tokens: &TokenService) -> Result<AuthContext, AuthError> {
    let token = extract_token(headers).ok_or(AuthError::MissingCredentials)?;

    if token.is_empty() {
        return Err(AuthError::InvalidToken);
    }

    let user_id = tokens.verify(&token).map_err(|_| AuthError::InvalidToken)?;

    Ok(AuthContext::new(user_id))
}

/// Reads a single cookie from all `Cookie` headers
fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.trim_matches('"').to_string())
        .filter(|value| !value.is_empty())
}

/// Builds the `Set-Cookie` value carrying an access token
///
/// The cookie is httpOnly, `SameSite=Lax`, scoped to `/` and lives as long as
/// the token. `secure` adds the `Secure` attribute for HTTPS deployments.
pub fn session_cookie(token: &str, max_age: Duration, secure: bool) -> String {
    let mut cookie = format!(
        "{}={}; Max-Age={}; Path=/; HttpOnly; SameSite=Lax",
        AUTH_COOKIE_NAME,
        token,
        max_age.num_seconds().max(0)
    );
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// Builds the `Set-Cookie` value that removes the access token cookie
pub fn clear_session_cookie(secure: bool) -> String {
    session_cookie("", Duration::zero(), secure)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    const SECRET: &str = "test-secret-key-at-least-32-bytes-long";

    fn tokens() -> TokenService {
        TokenService::new(SECRET, Duration::minutes(15))
    }

    fn headers(pairs: &[(header::HeaderName, String)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.append(name.clone(), HeaderValue::from_str(value).unwrap());
        }
        map
    }

    #[test]
    fn test_missing_credentials() {
        let result = resolve_caller(&HeaderMap::new(), &tokens());
        assert_eq!(result, Err(AuthError::MissingCredentials));
    }

    #[test]
    fn test_bearer_header() {
        let tokens = tokens();
        let user_id = Uuid::new_v4();
        let token = tokens.issue(user_id, None).unwrap();

        let map = headers(&[(header::AUTHORIZATION, format!("Bearer {}", token))]);
        assert_eq!(resolve_caller(&map, &tokens).unwrap().user_id, user_id);
    }

    #[test]
    fn test_cookie_fallback() {
        let tokens = tokens();
        let user_id = Uuid::new_v4();
        let token = tokens.issue(user_id, None).unwrap();

        let map = headers(&[(header::COOKIE, format!("theme=dark; access_token={}", token))]);
        assert_eq!(resolve_caller(&map, &tokens).unwrap().user_id, user_id);
    }

    #[test]
    fn test_header_takes_priority_over_cookie() {
        let tokens = tokens();
        let header_user = Uuid::new_v4();
        let cookie_user = Uuid::new_v4();
        let header_token = tokens.issue(header_user, None).unwrap();
        let cookie_token = tokens.issue(cookie_user, None).unwrap();

        let map = headers(&[
            (header::AUTHORIZATION, format!("Bearer {}", header_token)),
            (header::COOKIE, format!("access_token={}", cookie_token)),
        ]);
        assert_eq!(resolve_caller(&map, &tokens).unwrap().user_id, header_user);
    }

    #[test]
    fn test_invalid_header_does_not_fall_back_to_cookie() {
        let tokens = tokens();
        let cookie_token = tokens.issue(Uuid::new_v4(), None).unwrap();

        let map = headers(&[
            (header::AUTHORIZATION, "Bearer garbage".to_string()),
            (header::COOKIE, format!("access_token={}", cookie_token)),
        ]);
        assert_eq!(resolve_caller(&map, &tokens), Err(AuthError::InvalidToken));
    }

    #[test]
    fn test_non_bearer_header_falls_back_to_cookie() {
        let tokens = tokens();
        let user_id = Uuid::new_v4();
        let cookie_token = tokens.issue(user_id, None).unwrap();

        let map = headers(&[
            (header::AUTHORIZATION, "Basic dXNlcjpwYXNz".to_string()),
            (header::COOKIE, format!("access_token={}", cookie_token)),
        ]);
        assert_eq!(resolve_caller(&map, &tokens).unwrap().user_id, user_id);
    }

    #[test]
    fn test_expired_token_rejected() {
        let tokens = tokens();
        let token = tokens
            .issue(Uuid::new_v4(), Some(Duration::seconds(-3600)))
            .unwrap();

        let map = headers(&[(header::AUTHORIZATION, format!("Bearer {}", token))]);
        assert_eq!(resolve_caller(&map, &tokens), Err(AuthError::InvalidToken));
    }

    #[test]
    fn test_empty_bearer_is_invalid() {
        let map = headers(&[(header::AUTHORIZATION, "Bearer ".to_string())]);
        assert_eq!(resolve_caller(&map, &tokens()), Err(AuthError::InvalidToken));
    }

    #[test]
    fn test_empty_cookie_is_missing() {
        let map = headers(&[(header::COOKIE, "access_token=".to_string())]);
        assert_eq!(extract_token(&map), None);
    }

    #[test]
    fn test_session_cookie_attributes() {
        let cookie = session_cookie("abc", Duration::minutes(15), false);
        assert_eq!(cookie, "access_token=abc; Max-Age=900; Path=/; HttpOnly; SameSite=Lax");

        let secure = session_cookie("abc", Duration::minutes(15), true);
        assert!(secure.ends_with("; Secure"));
    }

    #[test]
    fn test_clear_session_cookie() {
        let cookie = clear_session_cookie(false);
        assert!(cookie.starts_with("access_token=;"));
        assert!(cookie.contains("Max-Age=0"));
    }
}
