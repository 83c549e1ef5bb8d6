//! Error taxonomy for service operations.
//!
//! `NotFound`, `Conflict` and `Validation` are expected outcomes a client can
//! trigger and act on. `Storage` means the record store itself failed; the
//! transport layer reports it generically and keeps the details in the logs.

use crate::store::StoreError;
use crate::validation::ValidationError;
use std::fmt;
use thiserror::Error;

/// Why a write was refused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ConflictReason {
    /// The user already holds a registration for the event
    AlreadyRegistered,
    /// Capacity is exhausted and the event has no waitlist
    EventFull,
    /// An event with the requested identifier exists
    EventExists,
    /// A user with the requested identifier exists
    UserExists,
}

impl fmt::Display for ConflictReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message = match self {
            Self::AlreadyRegistered => "user is already registered for this event",
            Self::EventFull => "event is full and has no waitlist",
            Self::EventExists => "an event with this id already exists",
            Self::UserExists => "a user with this id already exists",
        };
        f.write_str(message)
    }
}

/// Errors returned by the lifecycle manager and the catalog services.
#[derive(Error, Debug)]
pub enum RegistrationError {
    /// A referenced event, user or registration does not exist.
    #[error("{entity} with id {id} not found")]
    NotFound {
        /// Kind of record ("Event", "User", "Registration")
        entity: &'static str,
        /// Identifier that was looked up
        id: String,
    },

    /// The operation would violate a uniqueness or capacity rule.
    #[error("Conflict: {0}")]
    Conflict(ConflictReason),

    /// Input was rejected before any storage call.
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// The record store failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),
}

impl RegistrationError {
    /// Shorthand for [`RegistrationError::NotFound`].
    #[must_use]
    pub fn not_found(entity: &'static str, id: impl fmt::Display) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Metric label for the error kind.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "not_found",
            Self::Conflict(_) => "conflict",
            Self::Validation(_) => "validation",
            Self::Storage(_) => "storage",
        }
    }
}
