//! Event and user CRUD services.
//!
//! Thin validated wrappers over the [`RecordStore`]: every input is checked
//! before the first storage call, and creation relies on the store's
//! insert-if-absent so that an identifier is never silently overwritten.

use crate::environment::IdGenerator;
use crate::error::{ConflictReason, RegistrationError};
use crate::store::{RecordStore, StoreError};
use crate::types::{Event, EventId, EventPatch, EventStatus, NewEvent, NewUser, User, UserId};
use std::sync::Arc;
use tracing::info;

/// Maps a store insert failure, turning `AlreadyExists` into `reason`.
fn insert_error(error: StoreError, reason: ConflictReason) -> RegistrationError {
    match error {
        StoreError::AlreadyExists(_) => RegistrationError::Conflict(reason),
        other => other.into(),
    }
}

/// Create, read, update and delete events.
#[derive(Clone)]
pub struct EventCatalog {
    store: Arc<dyn RecordStore>,
    ids: Arc<dyn IdGenerator>,
}

impl EventCatalog {
    /// Creates a new `EventCatalog`
    #[must_use]
    pub fn new(store: Arc<dyn RecordStore>, ids: Arc<dyn IdGenerator>) -> Self {
        Self { store, ids }
    }

    /// Create an event under the client's identifier or a generated one.
    ///
    /// # Errors
    ///
    /// - `Validation`: a field is blank or too long
    /// - `Conflict(EventExists)`: the identifier is taken
    /// - `Storage`: the record store failed
    pub async fn create_event(&self, input: NewEvent) -> Result<Event, RegistrationError> {
        input.validate()?;

        let event_id = input
            .event_id
            .clone()
            .unwrap_or_else(|| EventId::new(self.ids.next_id()));
        let event = input.into_event(event_id);

        self.store
            .insert_event(event.clone())
            .await
            .map_err(|e| insert_error(e, ConflictReason::EventExists))?;

        info!(
            event_id = %event.event_id,
            capacity = %event.capacity,
            has_waitlist = event.has_waitlist,
            "Event created"
        );
        Ok(event)
    }

    /// Load an event.
    ///
    /// # Errors
    ///
    /// - `NotFound`: unknown event
    /// - `Storage`: the record store failed
    pub async fn get_event(&self, event_id: EventId) -> Result<Event, RegistrationError> {
        self.store
            .get_event(event_id.clone())
            .await?
            .ok_or_else(|| RegistrationError::not_found("Event", &event_id))
    }

    /// List events, optionally with one status only.
    ///
    /// # Errors
    ///
    /// - `Storage`: the record store failed
    pub async fn list_events(
        &self,
        status: Option<EventStatus>,
    ) -> Result<Vec<Event>, RegistrationError> {
        Ok(self.store.list_events(status).await?)
    }

    /// Apply a partial update. An empty patch returns the event unchanged.
    ///
    /// # Errors
    ///
    /// - `Validation`: a present field is blank or too long
    /// - `NotFound`: unknown event
    /// - `Storage`: the record store failed
    pub async fn update_event(
        &self,
        event_id: EventId,
        patch: EventPatch,
    ) -> Result<Event, RegistrationError> {
        patch.validate()?;

        if patch.is_empty() {
            return self.get_event(event_id).await;
        }

        let event = self
            .store
            .update_event(event_id.clone(), patch)
            .await?
            .ok_or_else(|| RegistrationError::not_found("Event", &event_id))?;

        info!(event_id = %event.event_id, status = %event.status, "Event updated");
        Ok(event)
    }

    /// Delete an event. Its registrations are left in place.
    ///
    /// # Errors
    ///
    /// - `NotFound`: unknown event
    /// - `Storage`: the record store failed
    pub async fn delete_event(&self, event_id: EventId) -> Result<(), RegistrationError> {
        if !self.store.delete_event(event_id.clone()).await? {
            return Err(RegistrationError::not_found("Event", &event_id));
        }

        info!(event_id = %event_id, "Event deleted");
        Ok(())
    }
}

/// Create and read users.
#[derive(Clone)]
pub struct UserDirectory {
    store: Arc<dyn RecordStore>,
    ids: Arc<dyn IdGenerator>,
}

impl UserDirectory {
    /// Creates a new `UserDirectory`
    #[must_use]
    pub fn new(store: Arc<dyn RecordStore>, ids: Arc<dyn IdGenerator>) -> Self {
        Self { store, ids }
    }

    /// Create a user under the client's identifier or a generated one.
    ///
    /// # Errors
    ///
    /// - `Validation`: blank or overlong name, malformed identifier
    /// - `Conflict(UserExists)`: the identifier is taken
    /// - `Storage`: the record store failed
    pub async fn create_user(&self, input: NewUser) -> Result<User, RegistrationError> {
        input.validate()?;

        let user_id = input
            .user_id
            .clone()
            .unwrap_or_else(|| UserId::new(self.ids.next_id()));
        let user = input.into_user(user_id);

        self.store
            .insert_user(user.clone())
            .await
            .map_err(|e| insert_error(e, ConflictReason::UserExists))?;

        info!(user_id = %user.user_id, "User created");
        Ok(user)
    }

    /// Load a user.
    ///
    /// # Errors
    ///
    /// - `NotFound`: unknown user
    /// - `Storage`: the record store failed
    pub async fn get_user(&self, user_id: UserId) -> Result<User, RegistrationError> {
        self.store
            .get_user(user_id.clone())
            .await?
            .ok_or_else(|| RegistrationError::not_found("User", &user_id))
    }
}
