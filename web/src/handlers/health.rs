//! Health check endpoints.
//!
//! These endpoints are used by load balancers and monitoring systems
//! to verify service health.

use crate::error::AppError;
use axum::{Json, extract::State};
use rsvp_core::store::RecordStore;
use serde::Serialize;
use std::sync::Arc;

/// Health probe response body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HealthStatus {
    /// `"healthy"` or `"ready"`
    pub status: &'static str,
}

/// Simple health check endpoint (for basic liveness).
///
/// This endpoint does NOT check dependencies (database, etc.).
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
/// { "status": "healthy" }
/// ```
#[allow(clippy::unused_async)]
pub async fn health_check() -> Json<HealthStatus> {
    Json(HealthStatus { status: "healthy" })
}

/// Readiness check: succeeds only if the record store answers.
///
/// # Status Codes
///
/// - 200 OK: the store responded to a ping
/// - 503 Service Unavailable: the store is unreachable
///
/// # Endpoint
///
/// ```text
/// GET /ready
/// ```
///
/// # Errors
///
/// Returns a 503 [`AppError`] when the ping fails.
pub async fn readiness_check(
    State(store): State<Arc<dyn RecordStore>>,
) -> Result<Json<HealthStatus>, AppError> {
    store.ping().await.map_err(|e| {
        tracing::warn!(error = %e, "Readiness check failed");
        AppError::unavailable("Record store is unavailable").with_source(e.into())
    })?;

    Ok(Json(HealthStatus { status: "ready" }))
}
