/// Authentication and authorization utilities
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing and verification
/// - [`jwt`]: Signed, time-limited access tokens
/// - [`guard`]: Credential extraction (bearer header or cookie) and caller resolution
/// - [`authorization`]: Owner and path-user checks
///
/// # Example
///
/// ```
/// use todo_shared::auth::jwt::TokenService;
/// use todo_shared::auth::password::{hash_password, verify_password};
/// use chrono::Duration;
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hash = hash_password("user_password")?;
/// assert!(verify_password("user_password", &hash));
///
/// let tokens = TokenService::new("a-secret-that-is-at-least-32-bytes!", Duration::minutes(15));
/// let user_id = Uuid::new_v4();
/// let token = tokens.issue(user_id, None)?;
/// assert_eq!(tokens.verify(&token)?, user_id);
/// # Ok(())
/// # }
/// ```

pub mod authorization;
pub mod guard;
pub mod jwt;
pub mod password;
