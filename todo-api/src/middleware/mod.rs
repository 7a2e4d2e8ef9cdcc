/// Middleware for the API server
///
/// - `auth`: resolves the caller from a bearer header or cookie
/// - `security`: security response headers

pub mod auth;
pub mod security;
