/// JWT access token issuing and verification
///
/// Tokens are HS256-signed JWTs binding a user id (`sub`) to an absolute
/// expiry. The signing key and default lifetime live in a [`TokenService`]
/// built once at startup and shared by reference; rotating the secret
/// invalidates every token issued with the old one.
///
/// # Claims
///
/// - `sub`: User ID
/// - `iss`: Always `"todo-api"`
/// - `iat` / `nbf`: Issue time (Unix seconds)
/// - `exp`: Expiry (Unix seconds)
///
/// # Example
///
/// ```
/// use todo_shared::auth::jwt::TokenService;
/// use chrono::Duration;
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let tokens = TokenService::new("your-secret-key-at-least-32-bytes!!", Duration::minutes(15));
/// let user_id = Uuid::new_v4();
///
/// let token = tokens.issue(user_id, None)?;
/// assert_eq!(tokens.verify(&token)?, user_id);
/// # Ok(())
/// # }
/// ```

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Issuer embedded in and required from every token
pub const ISSUER: &str = "todo-api";

/// Error type for JWT operations
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    /// Failed to create token
    #[error("Failed to create token: {0}")]
    CreateError(String),

    /// Token rejected
    ///
    /// Covers expiry, malformed input, wrong issuer and signature mismatch
    /// alike. The specific reason is only logged.
    #[error("Invalid or expired token")]
    Invalid,
}

/// JWT claims structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject - User ID
    pub sub: Uuid,

    /// Issuer - Always "todo-api"
    pub iss: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// Not before (Unix timestamp)
    pub nbf: i64,
}

impl Claims {
    /// Creates claims for `user_id` expiring `expires_in` from now
    pub fn new(user_id: Uuid, expires_in: Duration) -> Self {
        let now = Utc::now();
        let expiration = now + expires_in;

        Self {
            sub: user_id,
            iss: ISSUER.to_string(),
            iat: now.timestamp(),
            exp: expiration.timestamp(),
            nbf: now.timestamp(),
        }
    }

    /// Checks if token has expired
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }
}

/// Issues and verifies access tokens with a process-wide signing key
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    default_ttl: Duration,
}

impl fmt::Debug for TokenService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenService")
            .field("default_ttl", &self.default_ttl)
            .finish_non_exhaustive()
    }
}

impl TokenService {
    /// Creates a token service
    ///
    /// # Arguments
    ///
    /// * `secret` - HS256 signing secret (at least 32 bytes in production)
    /// * `default_ttl` - Lifetime used when `issue` is called without a TTL
    pub fn new(secret: &str, default_ttl: Duration) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            default_ttl,
        }
    }

    /// Lifetime applied to tokens issued without an explicit TTL
    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// Issues a signed token for `subject`
    ///
    /// The token expires at `now + ttl`, where `ttl` falls back to the
    /// configured default.
    ///
    /// # Errors
    ///
    /// Returns `JwtError::CreateError` if encoding fails
    pub fn issue(&self, subject: Uuid, ttl: Option<Duration>) -> Result<String, JwtError> {
        let claims = Claims::new(subject, ttl.unwrap_or(self.default_ttl));
        self.encode(&claims)
    }

    /// Signs arbitrary claims
    pub fn encode(&self, claims: &Claims) -> Result<String, JwtError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|e| JwtError::CreateError(format!("Token encoding failed: {}", e)))
    }

    /// Verifies a token and returns its subject
    ///
    /// Checks signature, issuer, `exp` and `nbf`.
    ///
    /// # Errors
    ///
    /// Returns `JwtError::Invalid` for every kind of rejection
    pub fn verify(&self, token: &str) -> Result<Uuid, JwtError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[ISSUER]);
        validation.set_required_spec_claims(&["exp", "sub", "iss"]);
        validation.validate_exp = true;
        validation.validate_nbf = true;

        let token_data = decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
            tracing::debug!(reason = ?e.kind(), "Rejected access token");
            JwtError::Invalid
        })?;

        Ok(token_data.claims.sub)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-key-at-least-32-bytes-long";

    fn service() -> TokenService {
        TokenService::new(SECRET, Duration::minutes(15))
    }

    #[test]
    fn test_claims_creation() {
        let user_id = Uuid::new_v4();
        let claims = Claims::new(user_id, Duration::minutes(15));

        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.iss, ISSUER);
        assert_eq!(claims.exp - claims.iat, 15 * 60);
        assert!(!claims.is_expired());
    }

    #[test]
    fn test_issue_and_verify() {
        let tokens = service();
        let user_id = Uuid::new_v4();

        let token = tokens.issue(user_id, None).expect("Should issue token");
        assert_eq!(tokens.verify(&token).expect("Should verify"), user_id);
    }

    #[test]
    fn test_issue_with_custom_ttl() {
        let tokens = service();
        let token = tokens.issue(Uuid::new_v4(), Some(Duration::hours(1))).unwrap();
        assert!(tokens.verify(&token).is_ok());
    }

    #[test]
    fn test_verify_with_wrong_secret() {
        let token = service().issue(Uuid::new_v4(), None).unwrap();
        let other = TokenService::new("another-secret-key-of-32-bytes-or-more", Duration::minutes(15));

        assert!(matches!(other.verify(&token), Err(JwtError::Invalid)));
    }

    #[test]
    fn test_verify_expired_token() {
        let tokens = service();
        // Well past the decoder's default leeway
        let token = tokens.issue(Uuid::new_v4(), Some(Duration::seconds(-3600))).unwrap();

        assert!(matches!(tokens.verify(&token), Err(JwtError::Invalid)));
    }

    #[test]
    fn test_verify_malformed_token() {
        let tokens = service();
        assert!(matches!(tokens.verify("not-a-jwt"), Err(JwtError::Invalid)));
        assert!(matches!(tokens.verify(""), Err(JwtError::Invalid)));
    }

    #[test]
    fn test_verify_wrong_issuer() {
        let tokens = service();
        let mut claims = Claims::new(Uuid::new_v4(), Duration::minutes(5));
        claims.iss = "someone-else".to_string();
        let token = tokens.encode(&claims).unwrap();

        assert!(matches!(tokens.verify(&token), Err(JwtError::Invalid)));
    }

    #[test]
    fn test_tampered_token_rejected() {
        let tokens = service();
        let victim = tokens.issue(Uuid::new_v4(), None).unwrap();
        let attacker = tokens.issue(Uuid::new_v4(), None).unwrap();

        // Attacker's payload under the victim's signature
        let victim_parts: Vec<&str> = victim.split('.').collect();
        let attacker_parts: Vec<&str> = attacker.split('.').collect();
        let forged = format!("{}.{}.{}", victim_parts[0], attacker_parts[1], victim_parts[2]);

        assert!(matches!(tokens.verify(&forged), Err(JwtError::Invalid)));
    }

    #[test]
    fn test_default_ttl_accessor() {
        assert_eq!(service().default_ttl(), Duration::minutes(15));
    }
}
