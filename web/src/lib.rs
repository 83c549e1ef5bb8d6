//! Axum integration for the RSVP event-registration service.
//!
//! This crate is the transport half of the Request Handling Layer: it turns
//! service outcomes into HTTP responses and wraps routers in the standard
//! observability stack. The routes themselves live in `rsvp-server`.
//!
//! # Request Flow
//!
//! 1. **HTTP Request** arrives and gets a request id (`x-request-id`)
//! 2. **Extract data** with [`ValidJson`] / [`ValidQuery`] (bad input → 422)
//! 3. **Call** the lifecycle manager or a catalog service
//! 4. **Map result** to an HTTP response through [`AppError`]
//!
//! # Example
//!
//! ```ignore
//! use rsvp_web::{AppError, ValidJson};
//! use axum::{Router, routing::post, Json};
//!
//! async fn create_user(
//!     State(state): State<AppState>,
//!     ValidJson(input): ValidJson<NewUser>,
//! ) -> Result<(StatusCode, Json<User>), AppError> {
//!     let user = state.users.create_user(input).await?;
//!     Ok((StatusCode::CREATED, Json(user)))
//! }
//!
//! let app = Router::new()
//!     .route("/users", post(create_user))
//!     .with_state(app_state);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod extractors;
pub mod handlers;
pub mod layers;

// Re-export key types for convenience
pub use error::{AppError, INTERNAL_ERROR_MESSAGE};
pub use extractors::{ValidJson, ValidQuery};
pub use layers::{REQUEST_ID_HEADER, apply_standard_layers, fallback};

/// Result type alias for web handlers.
pub type WebResult<T> = Result<T, AppError>;
