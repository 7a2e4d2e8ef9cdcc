/// User registration and credential checks
///
/// Password hashing and verification are CPU-bound, so both run on tokio's
/// blocking pool via `spawn_blocking`.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use todo_shared::services::users::{UserDirectory, UserError};
/// use todo_shared::store::memory::MemoryStore;
///
/// # async fn example() -> Result<(), UserError> {
/// let users = UserDirectory::new(Arc::new(MemoryStore::new()));
///
/// let alice = users.register("alice@example.com", "secret123").await?;
/// let found = users.authenticate("alice@example.com", "secret123").await?;
/// assert_eq!(found.map(|u| u.id), Some(alice.id));
///
/// assert!(users.authenticate("alice@example.com", "wrong").await?.is_none());
/// assert!(matches!(
///     users.register("alice@example.com", "another-pass").await,
///     Err(UserError::Conflict)
/// ));
/// # Ok(())
/// # }
/// ```

use std::sync::{Arc, OnceLock};

use tokio::task::{spawn_blocking, JoinError};
use uuid::Uuid;

use crate::auth::password::{hash_password, verify_password, PasswordError};
use crate::models::user::{CreateUser, User};
use crate::store::{StoreError, UserStore};

/// Error type for user directory operations
#[derive(Debug, thiserror::Error)]
pub enum UserError {
    /// Email is already registered
    #[error("Email already registered")]
    Conflict,

    #[error(transparent)]
    Password(#[from] PasswordError),

    #[error(transparent)]
    Store(StoreError),

    /// The blocking hash task panicked or was cancelled
    #[error("Password task failed: {0}")]
    Join(#[from] JoinError),
}

impl From<StoreError> for UserError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict => UserError::Conflict,
            other => UserError::Store(other),
        }
    }
}

/// Hash checked against when the email is unknown, so that a failed login
/// costs one Argon2 verification whether or not the account exists
fn unknown_user_hash() -> Option<&'static str> {
    static HASH: OnceLock<Option<String>> = OnceLock::new();
    HASH.get_or_init(|| hash_password("unknown-user-placeholder").ok())
        .as_deref()
}

/// Registered users, backed by any [`UserStore`]
#[derive(Clone)]
pub struct UserDirectory {
    store: Arc<dyn UserStore>,
}

impl std::fmt::Debug for UserDirectory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserDirectory").finish_non_exhaustive()
    }
}

impl UserDirectory {
    pub fn new(store: Arc<dyn UserStore>) -> Self {
        Self { store }
    }

    /// Registers a new user
    ///
    /// The email is stored exactly as given. A concurrent registration that
    /// slips past the existence check still fails with `Conflict` through the
    /// store's uniqueness guarantee.
    ///
    /// # Errors
    ///
    /// - `UserError::Conflict` if the email is taken
    /// - `UserError::Password` / `UserError::Join` if hashing fails
    pub async fn register(&self, email: &str, password: &str) -> Result<User, UserError> {
        if self.store.find_user_by_email(email).await?.is_some() {
            tracing::debug!("Registration rejected: email already registered");
            return Err(UserError::Conflict);
        }

        let password = password.to_owned();
        let password_hash = spawn_blocking(move || hash_password(&password)).await??;

        let user = self
            .store
            .insert_user(CreateUser {
                email: email.to_owned(),
                password_hash,
            })
            .await?;

        tracing::info!(user_id = %user.id, "User registered");
        Ok(user)
    }

    /// Checks an email/password pair
    ///
    /// Returns `None` for an unknown email and for a wrong password alike.
    /// Both cases run one password verification.
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<Option<User>, UserError> {
        let Some(user) = self.store.find_user_by_email(email).await? else {
            let password = password.to_owned();
            spawn_blocking(move || {
                if let Some(hash) = unknown_user_hash() {
                    verify_password(&password, hash);
                }
            })
            .await?;

            tracing::warn!("Login failed: unknown email");
            return Ok(None);
        };

        let password = password.to_owned();
        let hash = user.password_hash.clone();
        let valid = spawn_blocking(move || verify_password(&password, &hash)).await?;

        if !valid {
            tracing::warn!(user_id = %user.id, "Login failed: wrong password");
            return Ok(None);
        }

        tracing::info!(user_id = %user.id, "User authenticated");
        Ok(Some(user))
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, UserError> {
        Ok(self.store.find_user_by_id(id).await?)
    }
}
