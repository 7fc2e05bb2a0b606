//! Health check handler.

use axum::{extract::State, routing::get, Router};
use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::api::AppState;
use crate::types::ApiResponse;

/// Service status
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    #[schema(example = "running")]
    pub status: String,
    /// Build commit, or the crate version when unknown
    #[schema(example = "0.1.0")]
    pub version: String,
    /// Whether an admin account exists (first-time setup finished)
    pub initialized: bool,
    pub uptime_seconds: u64,
    pub timestamp: DateTime<Utc>,
}

pub fn health_routes() -> Router<AppState> {
    Router::new().route("/", get(health))
}

/// Health check
#[utoipa::path(
    get,
    path = "/api/health",
    tag = "Health",
    responses(
        (status = 200, description = "Service is running", body = HealthResponse)
    )
)]
pub async fn health(State(state): State<AppState>) -> ApiResponse<HealthResponse> {
    let initialized = state.auth_service.admin_exists().await.unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Admin lookup failed during health check");
        false
    });

    ApiResponse::success(HealthResponse {
        status: "running".to_string(),
        version: state.config.version.clone(),
        initialized,
        uptime_seconds: state.started_at.elapsed().as_secs(),
        timestamp: Utc::now(),
    })
}
