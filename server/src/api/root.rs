//! Service banner.

use axum::Json;
use serde::Serialize;

/// Body of `GET /`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ServiceInfo {
    /// Service name
    pub message: &'static str,
    /// Crate version
    pub version: &'static str,
}

/// Identify the service.
///
/// # Endpoint
///
/// ```text
/// GET /
/// ```
#[allow(clippy::unused_async)]
pub async fn index() -> Json<ServiceInfo> {
    Json(ServiceInfo {
        message: "Events API",
        version: env!("CARGO_PKG_VERSION"),
    })
}
