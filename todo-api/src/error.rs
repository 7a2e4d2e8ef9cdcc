/// Error handling for the API server
///
/// All handlers return `Result<T, ApiError>`. Errors from the shared crate
/// and extractor rejections convert into `ApiError` through `From`, and every
/// variant renders as the standard envelope with a stable `error.code`.
///
/// | Variant | Status | Code |
/// |---|---|---|
/// | `Validation` | 400 | `VALIDATION_ERROR` |
/// | `Unauthorized` | 401 | `UNAUTHENTICATED` |
/// | `InvalidCredentials` | 401 | `INVALID_CREDENTIALS` |
/// | `Forbidden` | 403 | `FORBIDDEN` |
/// | `NotFound` | 404 | `NOT_FOUND` |
/// | `EmailAlreadyExists` | 409 | `EMAIL_ALREADY_EXISTS` |
/// | `InternalError` | 500 | `INTERNAL_ERROR` |
///
/// # Example
///
/// ```
/// use axum::{http::StatusCode, response::IntoResponse};
/// use todo_api::error::ApiError;
///
/// let response = ApiError::NotFound("Task not found".to_string()).into_response();
/// assert_eq!(response.status(), StatusCode::NOT_FOUND);
/// ```

use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use std::fmt;
use todo_shared::{
    auth::{authorization::AuthzError, guard::AuthError, jwt::JwtError},
    models::task::FieldError,
    services::{tasks::TaskError, users::UserError},
};

use crate::response::{Envelope, ErrorBody};

/// API result type alias
pub type ApiResult<T> = Result<T, ApiError>;

/// Unified API error type
#[derive(Debug)]
pub enum ApiError {
    /// Malformed or invalid input (400)
    Validation(Vec<FieldError>),

    /// Missing, invalid or expired credentials (401)
    Unauthorized(String),

    /// Login with a wrong email/password pair (401)
    InvalidCredentials,

    /// Authenticated, but acting outside the caller's scope (403)
    Forbidden(String),

    /// Absent or foreign resource (404)
    NotFound(String),

    /// Route exists but not for this HTTP method (405)
    MethodNotAllowed,

    /// Email already registered (409)
    EmailAlreadyExists,

    /// Anything unexpected (500); the message is logged, never returned
    InternalError(String),
}

impl ApiError {
    /// Single-field validation error
    pub fn invalid(field: &str, message: impl Into<String>) -> Self {
        ApiError::Validation(vec![FieldError::new(field, message)])
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) | ApiError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::EmailAlreadyExists => StatusCode::CONFLICT,
            ApiError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Validation(_) => "VALIDATION_ERROR",
            ApiError::Unauthorized(_) => "UNAUTHENTICATED",
            ApiError::InvalidCredentials => "INVALID_CREDENTIALS",
            ApiError::Forbidden(_) => "FORBIDDEN",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::MethodNotAllowed => "METHOD_NOT_ALLOWED",
            ApiError::EmailAlreadyExists => "EMAIL_ALREADY_EXISTS",
            ApiError::InternalError(_) => "INTERNAL_ERROR",
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Validation(errors) => write!(f, "Validation failed: {} errors", errors.len()),
            ApiError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            ApiError::InvalidCredentials => write!(f, "Incorrect email or password"),
            ApiError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            ApiError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ApiError::MethodNotAllowed => write!(f, "Method not allowed"),
            ApiError::EmailAlreadyExists => write!(f, "Email already registered"),
            ApiError::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.code();

        let (message, details) = match self {
            ApiError::Validation(errors) => ("Request validation failed".to_string(), Some(errors)),
            ApiError::Unauthorized(msg) | ApiError::Forbidden(msg) | ApiError::NotFound(msg) => {
                (msg, None)
            }
            ApiError::InvalidCredentials => ("Incorrect email or password".to_string(), None),
            ApiError::MethodNotAllowed => ("Method not allowed".to_string(), None),
            ApiError::EmailAlreadyExists => ("Email already registered".to_string(), None),
            ApiError::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                ("An internal error occurred".to_string(), None)
            }
        };

        let body = Json(Envelope::failure(ErrorBody {
            code: code.to_string(),
            message,
            details,
        }));

        let mut response = (status, body).into_response();
        if status == StatusCode::UNAUTHORIZED {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        response
    }
}

impl From<TaskError> for ApiError {
    fn from(err: TaskError) -> Self {
        match err {
            TaskError::Validation(errors) => ApiError::Validation(errors),
            TaskError::NotFound => ApiError::NotFound("Task not found".to_string()),
            TaskError::Store(e) => ApiError::InternalError(format!("Task store error: {}", e)),
        }
    }
}

impl From<UserError> for ApiError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::Conflict => ApiError::EmailAlreadyExists,
            other => ApiError::InternalError(format!("User directory error: {}", other)),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::MissingCredentials => ApiError::Unauthorized("Not authenticated".to_string()),
            AuthError::InvalidToken => {
                ApiError::Unauthorized("Could not validate credentials".to_string())
            }
        }
    }
}

impl From<AuthzError> for ApiError {
    fn from(err: AuthzError) -> Self {
        match err {
            AuthzError::Forbidden => {
                ApiError::Forbidden("Not authorized to access this resource".to_string())
            }
        }
    }
}

impl From<JwtError> for ApiError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::Invalid => ApiError::Unauthorized("Could not validate credentials".to_string()),
            JwtError::CreateError(msg) => ApiError::InternalError(format!("Token creation failed: {}", msg)),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::invalid("body", rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::invalid("path", rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::invalid("query", rejection.body_text())
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut details: Vec<FieldError> = errors
            .field_errors()
            .iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |error| {
                    FieldError::new(
                        field.to_string(),
                        error
                            .message
                            .as_ref()
                            .map(|m| m.to_string())
                            .unwrap_or_else(|| "Validation failed".to_string()),
                    )
                })
            })
            .collect();
        details.sort_by(|a, b| a.field.cmp(&b.field));
        ApiError::Validation(details)
    }
}
