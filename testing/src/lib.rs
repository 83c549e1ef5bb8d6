//! # RSVP Testing
//!
//! Testing utilities for the event-registration service.
//!
//! This crate provides:
//! - [`InMemoryRecordStore`]: a `HashMap`-backed record store with fault injection
//! - [`FailingRecordStore`]: a record store whose every call fails
//! - Deterministic environment doubles ([`FixedClock`], [`SteppingClock`],
//!   [`SequentialIdGenerator`])
//! - Fixture builders and proptest strategies for domain types
//!
//! ## Example
//!
//! ```ignore
//! use rsvp_testing::{EventFixture, InMemoryRecordStore, registration_manager, user};
//! use rsvp_core::lifecycle::AdmissionMode;
//!
//! #[tokio::test]
//! async fn waitlists_when_full() {
//!     let store = InMemoryRecordStore::new();
//!     store.seed_event(EventFixture::new("evt-1").capacity(1).waitlist(true).build());
//!     store.seed_user(user("alice"));
//!     store.seed_user(user("bob"));
//!
//!     let manager = registration_manager(&store, AdmissionMode::Snapshot);
//!     // ...
//! }
//! ```

#![allow(clippy::unwrap_used)] // Test infrastructure uses unwrap for simplicity
#![allow(clippy::missing_panics_doc)] // Test utilities document panics where critical

mod memory_store;

pub use memory_store::{FailingRecordStore, InMemoryRecordStore, StoreOperation};

use chrono::{DateTime, TimeDelta, Utc};
use rsvp_core::environment::{Clock, IdGenerator};
use rsvp_core::lifecycle::{AdmissionMode, RegistrationEnvironment, RegistrationManager};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Mock implementations of environment traits.
pub mod mocks {
    use super::{AtomicU64, Clock, DateTime, IdGenerator, Ordering, TimeDelta, Utc};

    /// Fixed clock for deterministic tests
    ///
    /// Always returns the same time, making tests reproducible.
    ///
    /// # Example
    ///
    /// ```
    /// use rsvp_testing::mocks::FixedClock;
    /// use rsvp_core::environment::Clock;
    /// use chrono::Utc;
    ///
    /// let clock = FixedClock::new(Utc::now());
    /// assert_eq!(clock.now(), clock.now());
    /// ```
    #[derive(Debug, Clone)]
    pub struct FixedClock {
        time: DateTime<Utc>,
    }

    impl FixedClock {
        /// Create a new fixed clock with the given time
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self { time }
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.time
        }
    }

    /// Clock that advances by a fixed step on every reading.
    ///
    /// The first reading returns `start`. Consecutive registrations stamped
    /// by this clock therefore get strictly increasing `registered_at`.
    #[derive(Debug)]
    pub struct SteppingClock {
        start: DateTime<Utc>,
        step: TimeDelta,
        ticks: AtomicU64,
    }

    impl SteppingClock {
        /// Create a clock starting at `start` and advancing by `step` per call
        #[must_use]
        pub const fn new(start: DateTime<Utc>, step: TimeDelta) -> Self {
            Self {
                start,
                step,
                ticks: AtomicU64::new(0),
            }
        }

        /// Number of times the clock has been read
        #[must_use]
        pub fn readings(&self) -> u64 {
            self.ticks.load(Ordering::SeqCst)
        }
    }

    impl Clock for SteppingClock {
        fn now(&self) -> DateTime<Utc> {
            let tick = self.ticks.fetch_add(1, Ordering::SeqCst);
            self.start + self.step * i32::try_from(tick).unwrap()
        }
    }

    /// Predictable identifiers: `{prefix}-1`, `{prefix}-2`, ...
    #[derive(Debug)]
    pub struct SequentialIdGenerator {
        prefix: String,
        next: AtomicU64,
    }

    impl SequentialIdGenerator {
        /// Create a generator producing `{prefix}-N` starting at 1
        #[must_use]
        pub fn new(prefix: impl Into<String>) -> Self {
            Self {
                prefix: prefix.into(),
                next: AtomicU64::new(1),
            }
        }
    }

    impl IdGenerator for SequentialIdGenerator {
        fn next_id(&self) -> String {
            let n = self.next.fetch_add(1, Ordering::SeqCst);
            format!("{}-{n}", self.prefix)
        }
    }

    /// Create a default fixed clock for tests (2025-01-01 00:00:00 UTC)
    #[must_use]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(super::fixtures::timestamp(0))
    }
}

/// Fixture builders for domain records.
pub mod fixtures {
    use super::{DateTime, TimeDelta, Utc};
    use rsvp_core::types::{
        Capacity, Event, EventDate, EventId, EventStatus, NewEvent, Registration,
        RegistrationStatus, User, UserId,
    };

    /// `2025-01-01T00:00:00Z` plus `seconds`.
    #[must_use]
    pub fn timestamp(seconds: i64) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2025-01-01T00:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
            + TimeDelta::seconds(seconds)
    }

    /// A user named after its identifier.
    #[must_use]
    pub fn user(id: &str) -> User {
        User {
            user_id: UserId::new(id),
            name: format!("User {id}"),
        }
    }

    /// A registration record stamped `timestamp(seconds)`.
    #[must_use]
    pub fn registration(
        user_id: &str,
        event_id: &str,
        status: RegistrationStatus,
        seconds: i64,
    ) -> Registration {
        Registration {
            user_id: UserId::new(user_id),
            event_id: EventId::new(event_id),
            status,
            registered_at: timestamp(seconds),
        }
    }

    /// Builder for [`Event`] and [`NewEvent`] values.
    ///
    /// Defaults: capacity 10, no waitlist, status active.
    #[derive(Clone, Debug)]
    pub struct EventFixture {
        event_id: String,
        title: String,
        capacity: i64,
        has_waitlist: bool,
        status: EventStatus,
        date: String,
    }

    impl EventFixture {
        /// Start building an event with the given identifier
        #[must_use]
        pub fn new(event_id: &str) -> Self {
            Self {
                event_id: event_id.to_string(),
                title: format!("Event {event_id}"),
                capacity: 10,
                has_waitlist: false,
                status: EventStatus::Active,
                date: "2025-06-01T18:00:00Z".to_string(),
            }
        }

        /// Set the capacity
        #[must_use]
        pub const fn capacity(mut self, capacity: i64) -> Self {
            self.capacity = capacity;
            self
        }

        /// Enable or disable the waitlist
        #[must_use]
        pub const fn waitlist(mut self, has_waitlist: bool) -> Self {
            self.has_waitlist = has_waitlist;
            self
        }

        /// Set the status
        #[must_use]
        pub const fn status(mut self, status: EventStatus) -> Self {
            self.status = status;
            self
        }

        /// Set the title
        #[must_use]
        pub fn title(mut self, title: &str) -> Self {
            self.title = title.to_string();
            self
        }

        /// Set the date string
        #[must_use]
        pub fn date(mut self, date: &str) -> Self {
            self.date = date.to_string();
            self
        }

        /// Build the creation input (with the fixture's identifier)
        #[must_use]
        pub fn new_event(self) -> NewEvent {
            NewEvent {
                event_id: Some(EventId::new(self.event_id)),
                title: self.title,
                description: "Fixture event".to_string(),
                date: EventDate::new(self.date).unwrap(),
                location: "Main Hall".to_string(),
                capacity: Capacity::new(self.capacity).unwrap(),
                organizer: "Fixture Org".to_string(),
                status: self.status,
                has_waitlist: self.has_waitlist,
            }
        }

        /// Build the stored record
        #[must_use]
        pub fn build(self) -> Event {
            let event_id = EventId::new(self.event_id.clone());
            self.new_event().into_event(event_id)
        }
    }
}

/// Proptest strategies for domain values.
pub mod properties {
    use proptest::prelude::*;
    use rsvp_core::types::{Capacity, MAX_CAPACITY};

    /// Any valid capacity.
    pub fn arb_capacity() -> impl Strategy<Value = Capacity> {
        (1..=i64::from(MAX_CAPACITY)).prop_map(|value| Capacity::new(value).unwrap())
    }

    /// A small capacity, for scenarios that fill the event.
    pub fn small_capacity() -> impl Strategy<Value = Capacity> {
        (1_i64..=8).prop_map(|value| Capacity::new(value).unwrap())
    }

    /// Integers outside the valid capacity range.
    pub fn invalid_capacity() -> impl Strategy<Value = i64> {
        prop_oneof![i64::MIN..=0, (i64::from(MAX_CAPACITY) + 1)..=i64::MAX]
    }
}

/// A lifecycle manager over `store` whose clock advances one second per
/// registration, starting at `2025-01-01T00:00:00Z`.
#[must_use]
pub fn registration_manager(store: &InMemoryRecordStore, mode: AdmissionMode) -> RegistrationManager {
    RegistrationManager::new(RegistrationEnvironment::new(
        Arc::new(store.clone()),
        Arc::new(SteppingClock::new(fixtures::timestamp(0), TimeDelta::seconds(1))),
        mode,
    ))
}

/// Install a test-friendly tracing subscriber (idempotent).
///
/// Honours `RUST_LOG`; output goes through the test harness writer so it only
/// shows for failing tests.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

// Re-export commonly used items
pub use fixtures::{EventFixture, registration, timestamp, user};
pub use mocks::{FixedClock, SequentialIdGenerator, SteppingClock, test_clock};
