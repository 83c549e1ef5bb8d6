//! # RSVP Core
//!
//! Domain types and business rules for the event-registration service.
//!
//! The service manages events (capacity-bounded gatherings), users, and
//! registrations binding users to events. Its core is the admission and
//! waitlist-promotion protocol:
//!
//! - [`policy`]: the pure decision table (confirmed / waitlisted / rejected)
//! - [`lifecycle`]: registration create/delete against the record store,
//!   including FIFO promotion from the waitlist
//!
//! Everything else is validated CRUD over the [`store::RecordStore`] trait.
//!
//! ## Architecture
//!
//! ```text
//! HTTP handlers (rsvp-server)
//!        │
//!        ▼
//! RegistrationManager / EventCatalog / UserDirectory
//!        │  uses policy::decide, Clock, IdGenerator
//!        ▼
//! Arc<dyn RecordStore>  ──►  PostgresRecordStore | InMemoryRecordStore
//! ```
//!
//! ## Example
//!
//! ```ignore
//! use rsvp_core::lifecycle::{AdmissionMode, RegistrationEnvironment, RegistrationManager};
//! use rsvp_core::types::{EventId, RegistrationRequest, UserId};
//!
//! let manager = RegistrationManager::new(RegistrationEnvironment::new(
//!     store,
//!     Arc::new(SystemClock),
//!     AdmissionMode::Snapshot,
//! ));
//!
//! let registration = manager
//!     .create_registration(RegistrationRequest::new(UserId::new("u-1"), EventId::new("e-1")))
//!     .await?;
//! ```

pub mod catalog;
pub mod environment;
pub mod error;
pub mod lifecycle;
pub mod policy;
pub mod store;
pub mod types;
pub mod validation;

// Re-export commonly used types
pub use chrono::{DateTime, Utc};
pub use error::{ConflictReason, RegistrationError};
pub use store::{RecordStore, StoreError};
