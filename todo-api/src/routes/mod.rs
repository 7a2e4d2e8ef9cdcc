/// API route handlers
///
/// - `health`: Health check endpoint
/// - `auth`: Register, login, current user and logout
/// - `tasks`: Owner-scoped task CRUD and completion toggle

pub mod auth;
pub mod health;
pub mod tasks;

use crate::error::ApiError;

/// Fallback for unmatched routes
pub async fn not_found() -> ApiError {
    ApiError::NotFound("Route not found".to_string())
}

/// Fallback for a known path requested with an unsupported method
pub async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}
