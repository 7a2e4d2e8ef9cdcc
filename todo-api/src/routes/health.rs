/// Health check endpoint
///
/// # Endpoint
///
/// ```text
/// GET /health
/// ```
///
/// # Response
///
/// ```json
/// {
///   "success": true,
///   "data": { "status": "healthy", "version": "0.1.0", "storage": "postgres" },
///   "error": null
/// }
/// ```
///
/// `status` is `"degraded"` when the storage backend does not answer.

use axum::extract::State;
use serde::{Deserialize, Serialize};

use crate::{app::AppState, response::ApiResponse};

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// `healthy` or `degraded`
    pub status: String,

    /// Application version
    pub version: String,

    /// Storage backend name
    pub storage: String,
}

pub async fn health_check(State(state): State<AppState>) -> ApiResponse<HealthResponse> {
    let status = match state.health.ping().await {
        Ok(()) => "healthy",
        Err(e) => {
            tracing::warn!(error = %e, "Storage health check failed");
            "degraded"
        }
    };

    ApiResponse::ok(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        storage: state.health.backend().to_string(),
    })
}
