//! Property tests for sequential admission and promotion order.

#![allow(clippy::unwrap_used)] // Tests can unwrap

use proptest::prelude::*;
use rsvp_core::lifecycle::AdmissionMode;
use rsvp_core::types::{EventId, RegistrationRequest, RegistrationStatus, UserId};
use rsvp_testing::properties::small_capacity;
use rsvp_testing::{EventFixture, InMemoryRecordStore, registration, registration_manager, user};

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
}

fn mode() -> impl Strategy<Value = AdmissionMode> {
    prop_oneof![Just(AdmissionMode::Snapshot), Just(AdmissionMode::Counter)]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn sequential_admission_follows_policy(
        capacity in small_capacity(),
        extra in 0usize..6,
        has_waitlist in any::<bool>(),
        mode in mode(),
    ) {
        let seats = usize::try_from(capacity.value()).unwrap();
        let attempts = seats + extra;
        let store = InMemoryRecordStore::new();
        store.seed_event(
            EventFixture::new("evt-1")
                .capacity(i64::from(capacity.value()))
                .waitlist(has_waitlist)
                .build(),
        );
        for i in 0..attempts {
            store.seed_user(user(&format!("u{i}")));
        }
        let manager = registration_manager(&store, mode);

        let outcomes: Vec<Option<RegistrationStatus>> = runtime().block_on(async {
            let mut outcomes = Vec::new();
            for i in 0..attempts {
                let result = manager
                    .create_registration(RegistrationRequest::new(
                        UserId::new(format!("u{i}")),
                        EventId::new("evt-1"),
                    ))
                    .await;
                outcomes.push(result.ok().map(|r| r.status));
            }
            outcomes
        });

        for (i, outcome) in outcomes.iter().enumerate() {
            let expected = if i < seats {
                Some(RegistrationStatus::Confirmed)
            } else if has_waitlist {
                Some(RegistrationStatus::Waitlisted)
            } else {
                None
            };
            prop_assert_eq!(*outcome, expected);
        }
        prop_assert_eq!(store.count("evt-1", RegistrationStatus::Confirmed), seats);
    }

    #[test]
    fn promotion_always_takes_the_minimum(
        offsets in prop::collection::vec(0i64..20, 1..8),
    ) {
        let store = InMemoryRecordStore::new();
        store.seed_event(EventFixture::new("evt-1").capacity(1).waitlist(true).build());
        store.seed_registration(registration("holder", "evt-1", RegistrationStatus::Confirmed, 0));
        for (i, offset) in offsets.iter().enumerate() {
            store.seed_registration(registration(
                &format!("w{i:02}"),
                "evt-1",
                RegistrationStatus::Waitlisted,
                *offset,
            ));
        }
        let expected = offsets
            .iter()
            .enumerate()
            .map(|(i, offset)| (*offset, format!("w{i:02}")))
            .min()
            .map(|(_, id)| UserId::new(id));

        let manager = registration_manager(&store, AdmissionMode::Snapshot);
        let removal = runtime()
            .block_on(manager.delete_registration(UserId::new("holder"), EventId::new("evt-1")))
            .unwrap();

        prop_assert_eq!(removal.promoted.map(|r| r.user_id), expected);
        prop_assert_eq!(
            store.count("evt-1", RegistrationStatus::Waitlisted),
            offsets.len() - 1
        );
    }
}
