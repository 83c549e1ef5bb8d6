//! Capacity policy: decides what happens to a new registration attempt.
//!
//! This is the pure half of admission control. It performs no I/O; the
//! lifecycle manager is responsible for handing it a confirmed count that is
//! accurate at call time.
//!
//! ```text
//! confirmed < capacity        → Confirmed
//! full, waitlist enabled      → Waitlisted
//! full, no waitlist           → Rejected (nothing is stored)
//! ```

use crate::types::{Capacity, RegistrationStatus};

/// Result of running the capacity policy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Admission {
    /// A seat is available
    Confirmed,
    /// The event is full but keeps a waitlist
    Waitlisted,
    /// The event is full and has no waitlist
    Rejected,
}

impl Admission {
    /// Status to store for an admitted registration, `None` when rejected.
    #[must_use]
    pub const fn status(self) -> Option<RegistrationStatus> {
        match self {
            Self::Confirmed => Some(RegistrationStatus::Confirmed),
            Self::Waitlisted => Some(RegistrationStatus::Waitlisted),
            Self::Rejected => None,
        }
    }
}

/// Decides the status of a new registration attempt.
#[must_use]
pub const fn decide(confirmed_count: u32, capacity: Capacity, has_waitlist: bool) -> Admission {
    if confirmed_count < capacity.value() {
        Admission::Confirmed
    } else {
        overflow(has_waitlist)
    }
}

/// Outcome for an attempt that found no free seat.
#[must_use]
pub const fn overflow(has_waitlist: bool) -> Admission {
    if has_waitlist {
        Admission::Waitlisted
    } else {
        Admission::Rejected
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::MAX_CAPACITY;
    use proptest::prelude::*;

    fn capacity(value: u32) -> Capacity {
        Capacity::new(i64::from(value)).unwrap()
    }

    #[test]
    fn confirms_while_seats_remain() {
        assert_eq!(decide(0, capacity(1), false), Admission::Confirmed);
        assert_eq!(decide(4, capacity(5), true), Admission::Confirmed);
    }

    #[test]
    fn full_event_without_waitlist_rejects() {
        assert_eq!(decide(1, capacity(1), false), Admission::Rejected);
        assert_eq!(Admission::Rejected.status(), None);
    }

    #[test]
    fn full_event_with_waitlist_waitlists() {
        assert_eq!(decide(2, capacity(2), true), Admission::Waitlisted);
        assert_eq!(
            Admission::Waitlisted.status(),
            Some(RegistrationStatus::Waitlisted)
        );
    }

    #[test]
    fn over_capacity_counts_are_treated_as_full() {
        // Reachable through the count-then-insert race.
        assert_eq!(decide(7, capacity(5), true), Admission::Waitlisted);
        assert_eq!(decide(7, capacity(5), false), Admission::Rejected);
    }

    proptest! {
        #[test]
        fn never_rejects_when_waitlist_enabled(count in 0u32..200_000, cap in 1u32..=MAX_CAPACITY) {
            prop_assert_ne!(decide(count, capacity(cap), true), Admission::Rejected);
        }

        #[test]
        fn never_waitlists_without_waitlist(count in 0u32..200_000, cap in 1u32..=MAX_CAPACITY) {
            prop_assert_ne!(decide(count, capacity(cap), false), Admission::Waitlisted);
        }

        #[test]
        fn confirmed_iff_below_capacity(count in 0u32..200_000, cap in 1u32..=MAX_CAPACITY, waitlist in any::<bool>()) {
            let confirmed = decide(count, capacity(cap), waitlist) == Admission::Confirmed;
            prop_assert_eq!(confirmed, count < cap);
        }
    }
}
