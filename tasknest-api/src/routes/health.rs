/// Service banner and health check endpoints
///
/// The banner identifies the service; the health check additionally
/// verifies database connectivity. Neither requires authentication, and
/// the health check reports a degraded status instead of failing when the
/// database is unreachable.
///
/// # Endpoints
///
/// ```text
/// GET /
/// GET /health
/// ```
use crate::{app::AppState, error::ApiResult};
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

/// Service banner response
#[derive(Debug, Serialize, Deserialize)]
pub struct BannerResponse {
    /// Service greeting
    pub message: String,

    /// Application version
    pub version: String,
}

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Service status
    pub status: String,

    /// Application version
    pub version: String,

    /// Database status
    pub database: String,
}

/// Service banner handler
///
/// # Example
///
/// ```text
/// GET /
/// ```
///
/// Response:
/// ```json
/// {
///   "message": "TaskNest API",
///   "version": "0.1.0"
/// }
/// ```
pub async fn banner() -> Json<BannerResponse> {
    Json(BannerResponse {
        message: "TaskNest API".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Health check handler
///
/// Returns service health status including database connectivity.
///
/// # Example
///
/// ```text
/// GET /health
/// ```
///
/// Response:
/// ```json
/// {
///   "status": "healthy",
///   "version": "0.1.0",
///   "database": "connected"
/// }
/// ```
pub async fn health_check(State(state): State<AppState>) -> ApiResult<Json<HealthResponse>> {
    // Check database connectivity; an unreachable database degrades the
    // report instead of failing the endpoint
    let database_status = match sqlx::query("SELECT 1").fetch_one(&state.db).await {
        Ok(_) => "connected",
        Err(_) => "disconnected",
    };

    Ok(Json(HealthResponse {
        status: if database_status == "connected" {
            "healthy".to_string()
        } else {
            "degraded".to_string()
        },
        version: env!("CARGO_PKG_VERSION").to_string(),
        database: database_status.to_string(),
    }))
}
