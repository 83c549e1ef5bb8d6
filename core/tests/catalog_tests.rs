//! Event catalog and user directory behaviour.

#![allow(clippy::unwrap_used)] // Tests can unwrap

use rsvp_core::catalog::{EventCatalog, UserDirectory};
use rsvp_core::error::{ConflictReason, RegistrationError};
use rsvp_core::types::{
    Capacity, EventId, EventPatch, EventStatus, NewUser, RegistrationStatus, UserId,
};
use rsvp_testing::{
    EventFixture, FailingRecordStore, InMemoryRecordStore, SequentialIdGenerator, registration,
};
use std::sync::Arc;

fn catalog(store: &InMemoryRecordStore) -> EventCatalog {
    EventCatalog::new(
        Arc::new(store.clone()),
        Arc::new(SequentialIdGenerator::new("evt")),
    )
}

fn directory(store: &InMemoryRecordStore) -> UserDirectory {
    UserDirectory::new(
        Arc::new(store.clone()),
        Arc::new(SequentialIdGenerator::new("usr")),
    )
}

#[tokio::test]
async fn get_after_create_returns_same_record() {
    let store = InMemoryRecordStore::new();
    let events = catalog(&store);

    let created = events
        .create_event(EventFixture::new("launch").waitlist(true).new_event())
        .await
        .unwrap();
    let fetched = events.get_event(EventId::new("launch")).await.unwrap();

    assert_eq!(created, fetched);
    assert!(fetched.has_waitlist);
}

#[tokio::test]
async fn generated_identifier_when_absent() {
    let store = InMemoryRecordStore::new();
    let events = catalog(&store);

    let mut input = EventFixture::new("ignored").new_event();
    input.event_id = None;
    let created = events.create_event(input).await.unwrap();

    assert_eq!(created.event_id.as_str(), "evt-1");
}

#[tokio::test]
async fn duplicate_event_id_conflicts_without_overwrite() {
    let store = InMemoryRecordStore::new();
    let events = catalog(&store);
    events
        .create_event(EventFixture::new("launch").title("First").new_event())
        .await
        .unwrap();

    let err = events
        .create_event(EventFixture::new("launch").title("Second").new_event())
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        RegistrationError::Conflict(ConflictReason::EventExists)
    ));
    let kept = events.get_event(EventId::new("launch")).await.unwrap();
    assert_eq!(kept.title, "First");
}

#[tokio::test]
async fn list_filters_by_status() {
    let store = InMemoryRecordStore::new();
    let events = catalog(&store);
    for (id, status) in [
        ("a", EventStatus::Active),
        ("b", EventStatus::Cancelled),
        ("c", EventStatus::Active),
    ] {
        events
            .create_event(EventFixture::new(id).status(status).new_event())
            .await
            .unwrap();
    }

    assert_eq!(events.list_events(None).await.unwrap().len(), 3);
    let active = events.list_events(Some(EventStatus::Active)).await.unwrap();
    let ids: Vec<&str> = active.iter().map(|e| e.event_id.as_str()).collect();
    assert_eq!(ids, ["a", "c"]);
}

#[tokio::test]
async fn partial_update_touches_only_given_fields() {
    let store = InMemoryRecordStore::new();
    let events = catalog(&store);
    events
        .create_event(EventFixture::new("launch").capacity(5).new_event())
        .await
        .unwrap();

    let updated = events
        .update_event(
            EventId::new("launch"),
            EventPatch {
                capacity: Some(Capacity::new(50).unwrap()),
                status: Some(EventStatus::Scheduled),
                ..EventPatch::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.capacity.value(), 50);
    assert_eq!(updated.status, EventStatus::Scheduled);
    assert_eq!(updated.title, "Event launch");
}

#[tokio::test]
async fn empty_patch_returns_record_unchanged() {
    let store = InMemoryRecordStore::new();
    let events = catalog(&store);
    let created = events
        .create_event(EventFixture::new("launch").new_event())
        .await
        .unwrap();

    let same = events
        .update_event(EventId::new("launch"), EventPatch::default())
        .await
        .unwrap();
    assert_eq!(same, created);

    let missing = events
        .update_event(EventId::new("nope"), EventPatch::default())
        .await;
    assert!(matches!(missing, Err(RegistrationError::NotFound { .. })));
}

#[tokio::test]
async fn invalid_patch_is_rejected_before_storage() {
    let store = InMemoryRecordStore::new();
    let events = catalog(&store);
    events
        .create_event(EventFixture::new("launch").new_event())
        .await
        .unwrap();

    let err = events
        .update_event(
            EventId::new("launch"),
            EventPatch {
                organizer: Some("x".repeat(101)),
                ..EventPatch::default()
            },
        )
        .await
        .unwrap_err();

    assert!(matches!(err, RegistrationError::Validation(ref v) if v.field() == "organizer"));
}

#[tokio::test]
async fn delete_does_not_cascade_to_registrations() {
    let store = InMemoryRecordStore::new();
    let events = catalog(&store);
    events
        .create_event(EventFixture::new("launch").new_event())
        .await
        .unwrap();
    store.seed_registration(registration("a", "launch", RegistrationStatus::Confirmed, 0));

    events.delete_event(EventId::new("launch")).await.unwrap();

    assert!(matches!(
        events.get_event(EventId::new("launch")).await,
        Err(RegistrationError::NotFound { entity: "Event", .. })
    ));
    assert_eq!(store.registration_count(), 1);
    assert!(matches!(
        events.delete_event(EventId::new("launch")).await,
        Err(RegistrationError::NotFound { .. })
    ));
}

#[tokio::test]
async fn users_are_created_once_with_trimmed_names() {
    let store = InMemoryRecordStore::new();
    let users = directory(&store);

    let created = users
        .create_user(NewUser {
            user_id: Some(UserId::new("ada")),
            name: "  Ada  ".to_string(),
        })
        .await
        .unwrap();
    assert_eq!(created.name, "Ada");
    assert_eq!(users.get_user(UserId::new("ada")).await.unwrap(), created);

    let err = users
        .create_user(NewUser {
            user_id: Some(UserId::new("ada")),
            name: "Other".to_string(),
        })
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        RegistrationError::Conflict(ConflictReason::UserExists)
    ));

    let generated = users
        .create_user(NewUser {
            user_id: None,
            name: "Grace".to_string(),
        })
        .await
        .unwrap();
    assert_eq!(generated.user_id.as_str(), "usr-1");
}

#[tokio::test]
async fn blank_user_name_is_rejected() {
    let store = InMemoryRecordStore::new();
    let err = directory(&store)
        .create_user(NewUser {
            user_id: None,
            name: "   ".to_string(),
        })
        .await
        .unwrap_err();

    assert!(matches!(err, RegistrationError::Validation(_)));
}

#[tokio::test]
async fn storage_failures_are_storage_errors() {
    let users = UserDirectory::new(
        Arc::new(FailingRecordStore::default()),
        Arc::new(SequentialIdGenerator::new("usr")),
    );

    let err = users.get_user(UserId::new("ada")).await.unwrap_err();
    assert!(matches!(err, RegistrationError::Storage(_)));
    assert_eq!(err.kind(), "storage");
}
