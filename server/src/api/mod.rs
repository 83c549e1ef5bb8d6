//! HTTP endpoint handlers.
//!
//! Handlers are thin: extract, call a service, wrap the result. Every failure
//! flows through [`rsvp_web::AppError`].

pub mod events;
pub mod registrations;
pub mod root;
pub mod users;

use serde::Serialize;

/// Plain acknowledgement body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MessageResponse {
    /// Human-readable message
    pub message: String,
}

impl MessageResponse {
    /// Creates a new `MessageResponse`
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
