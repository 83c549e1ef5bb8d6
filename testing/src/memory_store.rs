//! In-memory record store for fast, deterministic tests.
//!
//! Every operation is applied under one lock, so each call is atomic just
//! like a single storage statement, and nothing spans calls.

use rsvp_core::store::{RecordStore, StoreError, StoreFuture};
use rsvp_core::types::{
    Event, EventId, EventPatch, EventStatus, Registration, RegistrationStatus, User, UserId,
    UserRegistration,
};
use std::collections::{HashMap, HashSet};
use std::future::ready;
use std::sync::{Arc, RwLock};

/// Record store operations that can be made to fail.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StoreOperation {
    /// `insert_event`
    InsertEvent,
    /// `get_event`
    GetEvent,
    /// `list_events`
    ListEvents,
    /// `update_event`
    UpdateEvent,
    /// `delete_event`
    DeleteEvent,
    /// `insert_user`
    InsertUser,
    /// `get_user`
    GetUser,
    /// `insert_registration`
    InsertRegistration,
    /// `get_registration`
    GetRegistration,
    /// `delete_registration`
    DeleteRegistration,
    /// `transition_registration`
    TransitionRegistration,
    /// `list_event_registrations`
    ListEventRegistrations,
    /// `list_user_registrations`
    ListUserRegistrations,
    /// `count_registrations`
    CountRegistrations,
    /// `first_waitlisted`
    FirstWaitlisted,
    /// `claim_seat`
    ClaimSeat,
    /// `release_seat`
    ReleaseSeat,
    /// `ping`
    Ping,
}

#[derive(Debug, Default)]
struct Records {
    events: HashMap<EventId, Event>,
    users: HashMap<UserId, User>,
    registrations: HashMap<(UserId, EventId), Registration>,
    seats: HashMap<EventId, u32>,
    failing: HashSet<StoreOperation>,
}

impl Records {
    fn check(&self, operation: StoreOperation) -> Result<(), StoreError> {
        if self.failing.contains(&operation) {
            return Err(StoreError::DatabaseError(format!(
                "injected failure: {operation:?}"
            )));
        }
        Ok(())
    }

    fn event_registrations(&self, event_id: &EventId) -> Vec<Registration> {
        let mut rows: Vec<Registration> = self
            .registrations
            .values()
            .filter(|r| &r.event_id == event_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.queue_position().cmp(&b.queue_position()));
        rows
    }
}

fn done<T: Send + 'static>(result: Result<T, StoreError>) -> StoreFuture<'static, T> {
    Box::pin(ready(result))
}

/// `HashMap`-backed [`RecordStore`].
///
/// Clones share the same data, so a test can keep a handle for inspection
/// while the code under test owns another.
///
/// # Example
///
/// ```
/// use rsvp_testing::{EventFixture, InMemoryRecordStore};
/// use rsvp_core::store::RecordStore;
/// use rsvp_core::types::EventId;
///
/// # tokio_test::block_on(async {
/// let store = InMemoryRecordStore::new();
/// store.seed_event(EventFixture::new("evt-1").build());
///
/// let event = store.get_event(EventId::new("evt-1")).await.unwrap();
/// assert!(event.is_some());
/// # });
/// ```
#[derive(Clone, Debug, Default)]
pub struct InMemoryRecordStore {
    records: Arc<RwLock<Records>>,
}

impl InMemoryRecordStore {
    /// Create a new empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store an event directly, replacing any existing one
    pub fn seed_event(&self, event: Event) {
        let mut records = self.records.write().unwrap();
        records.events.insert(event.event_id.clone(), event);
    }

    /// Store a user directly, replacing any existing one
    pub fn seed_user(&self, user: User) {
        let mut records = self.records.write().unwrap();
        records.users.insert(user.user_id.clone(), user);
    }

    /// Store a registration directly, replacing any existing one.
    ///
    /// Does not touch the seat counter.
    pub fn seed_registration(&self, registration: Registration) {
        let mut records = self.records.write().unwrap();
        records.registrations.insert(
            (registration.user_id.clone(), registration.event_id.clone()),
            registration,
        );
    }

    /// Make `operation` fail with a `DatabaseError` until [`Self::heal`]
    pub fn fail(&self, operation: StoreOperation) {
        self.records.write().unwrap().failing.insert(operation);
    }

    /// Stop injecting failures
    pub fn heal(&self) {
        self.records.write().unwrap().failing.clear();
    }

    /// All registrations of an event in waitlist order
    #[must_use]
    pub fn registrations_for(&self, event_id: &str) -> Vec<Registration> {
        self.records
            .read()
            .unwrap()
            .event_registrations(&EventId::new(event_id))
    }

    /// Number of registrations of an event with the given status
    #[must_use]
    pub fn count(&self, event_id: &str, status: RegistrationStatus) -> usize {
        self.registrations_for(event_id)
            .iter()
            .filter(|r| r.status == status)
            .count()
    }

    /// Current seat counter value of an event
    #[must_use]
    pub fn seats_taken(&self, event_id: &str) -> u32 {
        self.records
            .read()
            .unwrap()
            .seats
            .get(&EventId::new(event_id))
            .copied()
            .unwrap_or(0)
    }

    /// Total number of stored registrations
    #[must_use]
    pub fn registration_count(&self) -> usize {
        self.records.read().unwrap().registrations.len()
    }
}

impl RecordStore for InMemoryRecordStore {
    fn insert_event(&self, event: Event) -> StoreFuture<'_, ()> {
        let mut records = self.records.write().unwrap();
        let result = records.check(StoreOperation::InsertEvent).and_then(|()| {
            if records.events.contains_key(&event.event_id) {
                return Err(StoreError::AlreadyExists(format!(
                    "event {}",
                    event.event_id
                )));
            }
            records.events.insert(event.event_id.clone(), event);
            Ok(())
        });
        done(result)
    }

    fn get_event(&self, event_id: EventId) -> StoreFuture<'_, Option<Event>> {
        let records = self.records.read().unwrap();
        let result = records
            .check(StoreOperation::GetEvent)
            .map(|()| records.events.get(&event_id).cloned());
        done(result)
    }

    fn list_events(&self, status: Option<EventStatus>) -> StoreFuture<'_, Vec<Event>> {
        let records = self.records.read().unwrap();
        let result = records.check(StoreOperation::ListEvents).map(|()| {
            let mut events: Vec<Event> = records
                .events
                .values()
                .filter(|e| status.is_none_or(|s| e.status == s))
                .cloned()
                .collect();
            events.sort_by(|a, b| a.event_id.cmp(&b.event_id));
            events
        });
        done(result)
    }

    fn update_event(
        &self,
        event_id: EventId,
        patch: EventPatch,
    ) -> StoreFuture<'_, Option<Event>> {
        let mut records = self.records.write().unwrap();
        let result = records.check(StoreOperation::UpdateEvent).map(|()| {
            records.events.get_mut(&event_id).map(|event| {
                patch.apply_to(event);
                event.clone()
            })
        });
        done(result)
    }

    fn delete_event(&self, event_id: EventId) -> StoreFuture<'_, bool> {
        let mut records = self.records.write().unwrap();
        let result = records.check(StoreOperation::DeleteEvent).map(|()| {
            records.seats.remove(&event_id);
            records.events.remove(&event_id).is_some()
        });
        done(result)
    }

    fn insert_user(&self, user: User) -> StoreFuture<'_, ()> {
        let mut records = self.records.write().unwrap();
        let result = records.check(StoreOperation::InsertUser).and_then(|()| {
            if records.users.contains_key(&user.user_id) {
                return Err(StoreError::AlreadyExists(format!("user {}", user.user_id)));
            }
            records.users.insert(user.user_id.clone(), user);
            Ok(())
        });
        done(result)
    }

    fn get_user(&self, user_id: UserId) -> StoreFuture<'_, Option<User>> {
        let records = self.records.read().unwrap();
        let result = records
            .check(StoreOperation::GetUser)
            .map(|()| records.users.get(&user_id).cloned());
        done(result)
    }

    fn insert_registration(&self, registration: Registration) -> StoreFuture<'_, ()> {
        let mut records = self.records.write().unwrap();
        let result = records
            .check(StoreOperation::InsertRegistration)
            .and_then(|()| {
                let key = (registration.user_id.clone(), registration.event_id.clone());
                if records.registrations.contains_key(&key) {
                    return Err(StoreError::AlreadyExists(format!(
                        "registration {}/{}",
                        key.0, key.1
                    )));
                }
                records.registrations.insert(key, registration);
                Ok(())
            });
        done(result)
    }

    fn get_registration(
        &self,
        user_id: UserId,
        event_id: EventId,
    ) -> StoreFuture<'_, Option<Registration>> {
        let records = self.records.read().unwrap();
        let result = records
            .check(StoreOperation::GetRegistration)
            .map(|()| records.registrations.get(&(user_id, event_id)).cloned());
        done(result)
    }

    fn delete_registration(&self, user_id: UserId, event_id: EventId) -> StoreFuture<'_, bool> {
        let mut records = self.records.write().unwrap();
        let result = records
            .check(StoreOperation::DeleteRegistration)
            .map(|()| records.registrations.remove(&(user_id, event_id)).is_some());
        done(result)
    }

    fn transition_registration(
        &self,
        user_id: UserId,
        event_id: EventId,
        from: RegistrationStatus,
        to: RegistrationStatus,
    ) -> StoreFuture<'_, Option<Registration>> {
        let mut records = self.records.write().unwrap();
        let result = records
            .check(StoreOperation::TransitionRegistration)
            .map(|()| {
                records
                    .registrations
                    .get_mut(&(user_id, event_id))
                    .filter(|r| r.status == from)
                    .map(|r| {
                        r.status = to;
                        r.clone()
                    })
            });
        done(result)
    }

    fn list_event_registrations(
        &self,
        event_id: EventId,
        status: Option<RegistrationStatus>,
    ) -> StoreFuture<'_, Vec<Registration>> {
        let records = self.records.read().unwrap();
        let result = records
            .check(StoreOperation::ListEventRegistrations)
            .map(|()| {
                records
                    .event_registrations(&event_id)
                    .into_iter()
                    .filter(|r| status.is_none_or(|s| r.status == s))
                    .collect()
            });
        done(result)
    }

    fn list_user_registrations(&self, user_id: UserId) -> StoreFuture<'_, Vec<UserRegistration>> {
        let records = self.records.read().unwrap();
        let result = records
            .check(StoreOperation::ListUserRegistrations)
            .map(|()| {
                let mut rows: Vec<UserRegistration> = records
                    .registrations
                    .values()
                    .filter(|r| r.user_id == user_id)
                    .map(|r| UserRegistration {
                        registration: r.clone(),
                        event_title: records.events.get(&r.event_id).map(|e| e.title.clone()),
                    })
                    .collect();
                rows.sort_by(|a, b| {
                    (a.registration.registered_at, &a.registration.event_id)
                        .cmp(&(b.registration.registered_at, &b.registration.event_id))
                });
                rows
            });
        done(result)
    }

    fn count_registrations(
        &self,
        event_id: EventId,
        status: RegistrationStatus,
    ) -> StoreFuture<'_, u32> {
        let records = self.records.read().unwrap();
        let result = records.check(StoreOperation::CountRegistrations).map(|()| {
            let count = records
                .registrations
                .values()
                .filter(|r| r.event_id == event_id && r.status == status)
                .count();
            u32::try_from(count).unwrap_or(u32::MAX)
        });
        done(result)
    }

    fn first_waitlisted(&self, event_id: EventId) -> StoreFuture<'_, Option<Registration>> {
        let records = self.records.read().unwrap();
        let result = records.check(StoreOperation::FirstWaitlisted).map(|()| {
            records
                .event_registrations(&event_id)
                .into_iter()
                .find(|r| r.status == RegistrationStatus::Waitlisted)
        });
        done(result)
    }

    fn claim_seat(&self, event_id: EventId, capacity: u32) -> StoreFuture<'_, bool> {
        let mut records = self.records.write().unwrap();
        let result = records.check(StoreOperation::ClaimSeat).map(|()| {
            if !records.events.contains_key(&event_id) {
                return false;
            }
            let taken = records.seats.entry(event_id).or_insert(0);
            if *taken < capacity {
                *taken += 1;
                true
            } else {
                false
            }
        });
        done(result)
    }

    fn release_seat(&self, event_id: EventId) -> StoreFuture<'_, ()> {
        let mut records = self.records.write().unwrap();
        let result = records.check(StoreOperation::ReleaseSeat).map(|()| {
            if let Some(taken) = records.seats.get_mut(&event_id) {
                *taken = taken.saturating_sub(1);
            }
        });
        done(result)
    }

    fn ping(&self) -> StoreFuture<'_, ()> {
        let records = self.records.read().unwrap();
        done(records.check(StoreOperation::Ping))
    }
}

/// A [`RecordStore`] whose every call fails with a `DatabaseError`.
///
/// Exercises the opaque 500 path of the HTTP layer.
#[derive(Clone, Debug)]
pub struct FailingRecordStore {
    message: String,
}

impl FailingRecordStore {
    /// Create a store failing with `message`
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    fn fail<T: Send + 'static>(&self) -> StoreFuture<'static, T> {
        done(Err(StoreError::DatabaseError(self.message.clone())))
    }
}

impl Default for FailingRecordStore {
    fn default() -> Self {
        Self::new("connection refused")
    }
}

impl RecordStore for FailingRecordStore {
    fn insert_event(&self, _event: Event) -> StoreFuture<'_, ()> {
        self.fail()
    }

    fn get_event(&self, _event_id: EventId) -> StoreFuture<'_, Option<Event>> {
        self.fail()
    }

    fn list_events(&self, _status: Option<EventStatus>) -> StoreFuture<'_, Vec<Event>> {
        self.fail()
    }

    fn update_event(
        &self,
        _event_id: EventId,
        _patch: EventPatch,
    ) -> StoreFuture<'_, Option<Event>> {
        self.fail()
    }

    fn delete_event(&self, _event_id: EventId) -> StoreFuture<'_, bool> {
        self.fail()
    }

    fn insert_user(&self, _user: User) -> StoreFuture<'_, ()> {
        self.fail()
    }

    fn get_user(&self, _user_id: UserId) -> StoreFuture<'_, Option<User>> {
        self.fail()
    }

    fn insert_registration(&self, _registration: Registration) -> StoreFuture<'_, ()> {
        self.fail()
    }

    fn get_registration(
        &self,
        _user_id: UserId,
        _event_id: EventId,
    ) -> StoreFuture<'_, Option<Registration>> {
        self.fail()
    }

    fn delete_registration(&self, _user_id: UserId, _event_id: EventId) -> StoreFuture<'_, bool> {
        self.fail()
    }

    fn transition_registration(
        &self,
        _user_id: UserId,
        _event_id: EventId,
        _from: RegistrationStatus,
        _to: RegistrationStatus,
    ) -> StoreFuture<'_, Option<Registration>> {
        self.fail()
    }

    fn list_event_registrations(
        &self,
        _event_id: EventId,
        _status: Option<RegistrationStatus>,
    ) -> StoreFuture<'_, Vec<Registration>> {
        self.fail()
    }

    fn list_user_registrations(
        &self,
        _user_id: UserId,
    ) -> StoreFuture<'_, Vec<UserRegistration>> {
        self.fail()
    }

    fn count_registrations(
        &self,
        _event_id: EventId,
        _status: RegistrationStatus,
    ) -> StoreFuture<'_, u32> {
        self.fail()
    }

    fn first_waitlisted(&self, _event_id: EventId) -> StoreFuture<'_, Option<Registration>> {
        self.fail()
    }

    fn claim_seat(&self, _event_id: EventId, _capacity: u32) -> StoreFuture<'_, bool> {
        self.fail()
    }

    fn release_seat(&self, _event_id: EventId) -> StoreFuture<'_, ()> {
        self.fail()
    }

    fn ping(&self) -> StoreFuture<'_, ()> {
        self.fail()
    }
}
