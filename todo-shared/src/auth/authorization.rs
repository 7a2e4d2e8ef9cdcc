/// Ownership checks
///
/// The token subject is the single source of truth for who is calling. User
/// ids that arrive in a URL path are never trusted on their own; they are
/// only compared against the caller.
///
/// # Example
///
/// ```
/// use todo_shared::auth::authorization::{authorize_owner, require_path_user, AuthzError};
/// use uuid::Uuid;
///
/// let caller = Uuid::new_v4();
/// assert!(authorize_owner(caller, caller).is_ok());
/// assert!(matches!(require_path_user(caller, Uuid::new_v4()), Err(AuthzError::Forbidden)));
/// ```

use uuid::Uuid;

/// Error type for authorization checks
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum AuthzError {
    /// Authenticated, but not allowed to act on this resource or user scope
    #[error("Not authorized to access this resource")]
    Forbidden,
}

/// Checks that the caller owns a resource
pub fn authorize_owner(caller_id: Uuid, resource_owner_id: Uuid) -> Result<(), AuthzError> {
    if caller_id != resource_owner_id {
        tracing::debug!(%caller_id, %resource_owner_id, "Owner mismatch");
        return Err(AuthzError::Forbidden);
    }

    Ok(())
}

/// Checks that a path-supplied user id names the caller
///
/// Runs before any lookup, so the outcome does not depend on whether the
/// addressed resource exists.
pub fn require_path_user(caller_id: Uuid, path_user_id: Uuid) -> Result<(), AuthzError> {
    authorize_owner(caller_id, path_user_id)
}
