//! Prometheus metrics for the registration service.
//!
//! # Exported Metrics
//!
//! ## Counters
//! - `registrations.admitted{status}` - Registrations stored, by status
//! - `registrations.rejected{reason}` - Registrations refused (`event_full`, `already_registered`)
//! - `registrations.promoted` - Waitlisted registrations promoted to confirmed
//! - `registrations.deleted{status}` - Registrations removed, by status
//! - `record_store.errors{operation}` - Failed `PostgreSQL` statements
//! - `http.errors{status}` - Error responses, by HTTP status

use metrics::describe_counter;
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use thiserror::Error;

/// Errors from metrics operations.
#[derive(Error, Debug)]
pub enum MetricsError {
    /// The listen address does not parse
    #[error("Invalid metrics address {address}: {reason}")]
    Address {
        /// Address as configured
        address: String,
        /// Parser message
        reason: String,
    },
    /// Failed to install metrics exporter
    #[error("Failed to install metrics exporter: {0}")]
    Install(String),
}

/// Install the Prometheus recorder and serve `/metrics` on `address`.
///
/// Must be called from within a tokio runtime.
///
/// # Errors
///
/// Returns [`MetricsError`] if the address is invalid or a recorder is
/// already installed.
pub fn install_exporter(address: &str) -> Result<(), MetricsError> {
    let addr: SocketAddr = address.parse().map_err(|e: std::net::AddrParseError| {
        MetricsError::Address {
            address: address.to_string(),
            reason: e.to_string(),
        }
    })?;

    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| MetricsError::Install(e.to_string()))?;

    register_metrics();
    tracing::info!(addr = %addr, "Metrics available at http://{addr}/metrics");
    Ok(())
}

/// Register all metric descriptions.
fn register_metrics() {
    describe_counter!(
        "registrations.admitted",
        "Registrations stored, by status (confirmed, waitlisted)"
    );
    describe_counter!(
        "registrations.rejected",
        "Registration attempts refused, by reason"
    );
    describe_counter!(
        "registrations.promoted",
        "Waitlisted registrations promoted after a confirmed seat was freed"
    );
    describe_counter!("registrations.deleted", "Registrations removed, by status");
    describe_counter!(
        "record_store.errors",
        "Record store statements that failed, by operation"
    );
    describe_counter!("http.errors", "Error responses, by HTTP status");
}
