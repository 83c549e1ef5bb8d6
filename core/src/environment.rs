//! Injected dependencies.
//!
//! Time and identifier generation are abstracted behind traits so that the
//! lifecycle manager and the catalog services stay deterministic under test.
//! Production wiring uses [`SystemClock`] and [`UuidIdGenerator`]; the
//! `rsvp-testing` crate provides fixed and stepping clocks and a sequential
//! id generator.

use chrono::{DateTime, SubsecRound, Utc};
use uuid::Uuid;

/// Sub-second digits kept on registration timestamps.
///
/// Matches the microsecond resolution of `PostgreSQL` `TIMESTAMPTZ`, so a
/// timestamp reads back exactly as it was written in every store.
pub const TIMESTAMP_PRECISION: u16 = 6;

/// Clock trait - abstracts time operations for testability
///
/// # Examples
///
/// ```
/// use rsvp_core::environment::{Clock, SystemClock};
///
/// let clock = SystemClock;
/// let before = clock.now();
/// assert!(clock.now() >= before);
/// ```
pub trait Clock: Send + Sync {
    /// Get the current time
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time, truncated to [`TIMESTAMP_PRECISION`].
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now().trunc_subsecs(TIMESTAMP_PRECISION)
    }
}

/// Produces identifiers for records the client did not name.
pub trait IdGenerator: Send + Sync {
    /// Return a fresh identifier
    fn next_id(&self) -> String;
}

/// Random UUID v4 identifiers.
#[derive(Clone, Copy, Debug, Default)]
pub struct UuidIdGenerator;

impl IdGenerator for UuidIdGenerator {
    fn next_id(&self) -> String {
        Uuid::new_v4().to_string()
    }
}
