//! Record store trait and related types.
//!
//! The record store is the durable keyed storage behind the service. It holds
//! three collections (events, users, registrations) plus a secondary ordering
//! of registrations by `(event_id, registered_at, user_id)`.
//!
//! # Atomicity
//!
//! Every method is a single storage operation. The store offers:
//!
//! - point reads and writes
//! - insert-if-absent ([`RecordStore::insert_event`], [`RecordStore::insert_user`],
//!   [`RecordStore::insert_registration`]) reporting [`StoreError::AlreadyExists`]
//! - conditional status transitions ([`RecordStore::transition_registration`])
//! - an increment-if-below-capacity seat counter ([`RecordStore::claim_seat`])
//! - queries, with no snapshot consistency across calls
//!
//! There are no multi-record transactions. Callers composing several calls
//! (count, then insert) must tolerate interleaving with concurrent requests.
//!
//! # Implementations
//!
//! - `PostgresRecordStore` (in `rsvp-postgres`): production storage
//! - `InMemoryRecordStore` (in `rsvp-testing`): fast, deterministic tests
//!
//! # Dyn Compatibility
//!
//! Methods return boxed futures instead of using `async fn` so the store can
//! be shared as `Arc<dyn RecordStore>`.

use crate::types::{
    Event, EventId, EventPatch, EventStatus, Registration, RegistrationStatus, User, UserId,
    UserRegistration,
};
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

/// Boxed future returned by every [`RecordStore`] method.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + Send + 'a>>;

/// Errors that can occur during record store operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// An insert-if-absent found an existing record under the same key.
    #[error("Record already exists: {0}")]
    AlreadyExists(String),

    /// Database connection or query error.
    #[error("Database error: {0}")]
    DatabaseError(String),

    /// A stored record could not be decoded.
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

/// Durable keyed storage for events, users and registrations.
pub trait RecordStore: Send + Sync {
    // ------------------------------------------------------------------
    // Events
    // ------------------------------------------------------------------

    /// Insert an event unless one already exists under its identifier.
    ///
    /// # Errors
    ///
    /// - `AlreadyExists`: the identifier is taken
    /// - `DatabaseError`: storage failure
    fn insert_event(&self, event: Event) -> StoreFuture<'_, ()>;

    /// Load an event by identifier.
    ///
    /// # Errors
    ///
    /// - `DatabaseError` / `SerializationError`
    fn get_event(&self, event_id: EventId) -> StoreFuture<'_, Option<Event>>;

    /// List events, optionally restricted to one status.
    ///
    /// # Errors
    ///
    /// - `DatabaseError` / `SerializationError`
    fn list_events(&self, status: Option<EventStatus>) -> StoreFuture<'_, Vec<Event>>;

    /// Apply a partial update, returning the updated event or `None` if absent.
    ///
    /// # Errors
    ///
    /// - `DatabaseError` / `SerializationError`
    fn update_event(&self, event_id: EventId, patch: EventPatch)
    -> StoreFuture<'_, Option<Event>>;

    /// Delete an event. Returns `false` if it did not exist.
    ///
    /// Registrations for the event are left in place.
    ///
    /// # Errors
    ///
    /// - `DatabaseError`
    fn delete_event(&self, event_id: EventId) -> StoreFuture<'_, bool>;

    // ------------------------------------------------------------------
    // Users
    // ------------------------------------------------------------------

    /// Insert a user unless one already exists under its identifier.
    ///
    /// # Errors
    ///
    /// - `AlreadyExists`: the identifier is taken
    /// - `DatabaseError`: storage failure
    fn insert_user(&self, user: User) -> StoreFuture<'_, ()>;

    /// Load a user by identifier.
    ///
    /// # Errors
    ///
    /// - `DatabaseError` / `SerializationError`
    fn get_user(&self, user_id: UserId) -> StoreFuture<'_, Option<User>>;

    // ------------------------------------------------------------------
    // Registrations
    // ------------------------------------------------------------------

    /// Insert a registration unless the `(user_id, event_id)` pair exists.
    ///
    /// This is the only duplicate check: it is enforced by the store, not by
    /// a prior read.
    ///
    /// # Errors
    ///
    /// - `AlreadyExists`: the user is already registered for the event
    /// - `DatabaseError`: storage failure
    fn insert_registration(&self, registration: Registration) -> StoreFuture<'_, ()>;

    /// Load a registration by its composite key.
    ///
    /// # Errors
    ///
    /// - `DatabaseError` / `SerializationError`
    fn get_registration(
        &self,
        user_id: UserId,
        event_id: EventId,
    ) -> StoreFuture<'_, Option<Registration>>;

    /// Delete a registration. Returns `false` if it did not exist.
    ///
    /// # Errors
    ///
    /// - `DatabaseError`
    fn delete_registration(&self, user_id: UserId, event_id: EventId) -> StoreFuture<'_, bool>;

    /// Change a registration's status from `from` to `to` in place.
    ///
    /// `registered_at` is preserved. Returns `None` when the registration is
    /// absent or no longer has status `from` (a concurrent writer got there
    /// first).
    ///
    /// # Errors
    ///
    /// - `DatabaseError` / `SerializationError`
    fn transition_registration(
        &self,
        user_id: UserId,
        event_id: EventId,
        from: RegistrationStatus,
        to: RegistrationStatus,
    ) -> StoreFuture<'_, Option<Registration>>;

    /// List an event's registrations ordered by `(registered_at, user_id)`.
    ///
    /// # Errors
    ///
    /// - `DatabaseError` / `SerializationError`
    fn list_event_registrations(
        &self,
        event_id: EventId,
        status: Option<RegistrationStatus>,
    ) -> StoreFuture<'_, Vec<Registration>>;

    /// List a user's registrations joined with each event's title.
    ///
    /// # Errors
    ///
    /// - `DatabaseError` / `SerializationError`
    fn list_user_registrations(&self, user_id: UserId) -> StoreFuture<'_, Vec<UserRegistration>>;

    /// Count an event's registrations with the given status.
    ///
    /// # Errors
    ///
    /// - `DatabaseError`
    fn count_registrations(
        &self,
        event_id: EventId,
        status: RegistrationStatus,
    ) -> StoreFuture<'_, u32>;

    /// The waitlisted registration with the smallest `(registered_at, user_id)`.
    ///
    /// # Errors
    ///
    /// - `DatabaseError` / `SerializationError`
    fn first_waitlisted(&self, event_id: EventId) -> StoreFuture<'_, Option<Registration>>;

    // ------------------------------------------------------------------
    // Seat counter (counter admission mode)
    // ------------------------------------------------------------------

    /// Atomically take one seat if fewer than `capacity` are taken.
    ///
    /// Returns `false` when the event is full or does not exist.
    ///
    /// # Errors
    ///
    /// - `DatabaseError`
    fn claim_seat(&self, event_id: EventId, capacity: u32) -> StoreFuture<'_, bool>;

    /// Give back one seat taken with [`RecordStore::claim_seat`] (never below zero).
    ///
    /// # Errors
    ///
    /// - `DatabaseError`
    fn release_seat(&self, event_id: EventId) -> StoreFuture<'_, ()>;

    // ------------------------------------------------------------------
    // Health
    // ------------------------------------------------------------------

    /// Check that the store is reachable.
    ///
    /// # Errors
    ///
    /// - `DatabaseError`: the store cannot be reached
    fn ping(&self) -> StoreFuture<'_, ()>;
}
