//! Application state for the RSVP HTTP server.
//!
//! Contains the shared services handlers call into:
//! - Registration lifecycle manager
//! - Event catalog and user directory
//! - The record store itself (for readiness probes)

use axum::extract::FromRef;
use rsvp_core::catalog::{EventCatalog, UserDirectory};
use rsvp_core::environment::{Clock, IdGenerator};
use rsvp_core::lifecycle::{AdmissionMode, RegistrationEnvironment, RegistrationManager};
use rsvp_core::store::RecordStore;
use std::sync::Arc;

/// Application state shared across all HTTP handlers.
///
/// Every service holds the same long-lived store handle, built once at
/// startup. Cloning is cheap (`Arc`s only).
#[derive(Clone)]
pub struct AppState {
    /// Registration create/delete with capacity and waitlist handling
    pub registrations: RegistrationManager,

    /// Event CRUD
    pub events: EventCatalog,

    /// User creation and lookup
    pub users: UserDirectory,

    /// Shared record store
    pub store: Arc<dyn RecordStore>,
}

impl AppState {
    /// Wire every service to one record store.
    #[must_use]
    pub fn new(
        store: Arc<dyn RecordStore>,
        clock: Arc<dyn Clock>,
        ids: Arc<dyn IdGenerator>,
        mode: AdmissionMode,
    ) -> Self {
        Self {
            registrations: RegistrationManager::new(RegistrationEnvironment::new(
                Arc::clone(&store),
                clock,
                mode,
            )),
            events: EventCatalog::new(Arc::clone(&store), Arc::clone(&ids)),
            users: UserDirectory::new(Arc::clone(&store), ids),
            store,
        }
    }
}

// Lets the readiness probe extract the store directly.
impl FromRef<AppState> for Arc<dyn RecordStore> {
    fn from_ref(app_state: &AppState) -> Self {
        Arc::clone(&app_state.store)
    }
}
