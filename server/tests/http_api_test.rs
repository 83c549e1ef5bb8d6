//! HTTP contract tests against the full router and an in-memory store.

#![allow(clippy::unwrap_used)]
#![allow(clippy::too_many_lines)]

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use chrono::TimeDelta;
use rsvp_core::lifecycle::AdmissionMode;
use rsvp_core::store::RecordStore;
use rsvp_core::types::RegistrationStatus;
use rsvp_server::{AppState, build_router};
use rsvp_testing::{
    EventFixture, FailingRecordStore, InMemoryRecordStore, SequentialIdGenerator, SteppingClock,
    timestamp,
};
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt;

fn app_over(store: Arc<dyn RecordStore>, mode: AdmissionMode) -> Router {
    let state = AppState::new(
        store,
        Arc::new(SteppingClock::new(timestamp(0), TimeDelta::seconds(1))),
        Arc::new(SequentialIdGenerator::new("id")),
        mode,
    );
    build_router(state, &["*".to_string()])
}

fn app(store: &InMemoryRecordStore) -> Router {
    app_over(Arc::new(store.clone()), AdmissionMode::Snapshot)
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

async fn send_raw(app: &Router, method: Method, uri: &str, body: &'static str) -> StatusCode {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body))
        .unwrap();
    app.clone().oneshot(request).await.unwrap().status()
}

async fn create_event(app: &Router, fixture: EventFixture) {
    let body = serde_json::to_value(fixture.new_event()).unwrap();
    let (status, _) = send(app, Method::POST, "/events", Some(body)).await;
    assert_eq!(status, StatusCode::CREATED);
}

async fn create_user(app: &Router, user_id: &str) {
    let (status, _) = send(
        app,
        Method::POST,
        "/users",
        Some(json!({ "userId": user_id, "name": format!("User {user_id}") })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
}

async fn register(app: &Router, user_id: &str, event_id: &str) -> (StatusCode, Value) {
    send(
        app,
        Method::POST,
        "/registrations",
        Some(json!({ "userId": user_id, "eventId": event_id })),
    )
    .await
}

// ============================================================================
// Service endpoints
// ============================================================================

#[tokio::test]
async fn root_identifies_the_service() {
    let app = app(&InMemoryRecordStore::new());
    let (status, body) = send(&app, Method::GET, "/", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Events API");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn health_and_readiness() {
    let app = app(&InMemoryRecordStore::new());

    let (status, body) = send(&app, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");

    let (status, body) = send(&app, Method::GET, "/ready", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ready");
}

#[tokio::test]
async fn readiness_fails_when_store_is_down() {
    let app = app_over(Arc::new(FailingRecordStore::default()), AdmissionMode::Snapshot);
    let (status, body) = send(&app, Method::GET, "/ready", None).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["code"], "SERVICE_UNAVAILABLE");
}

#[tokio::test]
async fn unknown_route_is_json_404_with_request_id() {
    let app = app(&InMemoryRecordStore::new());
    let response = app
        .oneshot(Request::builder().uri("/nowhere").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(response.headers().contains_key("x-request-id"));
}

// ============================================================================
// Events
// ============================================================================

#[tokio::test]
async fn event_crud_round_trip() {
    let app = app(&InMemoryRecordStore::new());

    let (status, created) = send(
        &app,
        Method::POST,
        "/events",
        Some(json!({
            "title": "Rust Meetup",
            "description": "Monthly meetup",
            "date": "2025-06-01",
            "location": "Main Hall",
            "capacity": 50,
            "organizer": "Rust Users Group"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["eventId"], "id-1");
    assert_eq!(created["status"], "active");
    assert_eq!(created["hasWaitlist"], false);

    let (status, fetched) = send(&app, Method::GET, "/events/id-1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, created);

    let (status, patched) = send(
        &app,
        Method::PATCH,
        "/events/id-1",
        Some(json!({ "capacity": 75, "hasWaitlist": true })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(patched["capacity"], 75);
    assert_eq!(patched["hasWaitlist"], true);
    assert_eq!(patched["title"], "Rust Meetup");

    let (status, put) = send(
        &app,
        Method::PUT,
        "/events/id-1",
        Some(json!({ "status": "completed" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(put["status"], "completed");
    assert_eq!(put["capacity"], 75);

    let (status, body) = send(&app, Method::DELETE, "/events/id-1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Event deleted successfully");

    let (status, body) = send(&app, Method::GET, "/events/id-1", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");
    assert_eq!(body["message"], "Event with id id-1 not found");
}

#[tokio::test]
async fn list_events_filters_by_status() {
    let app = app(&InMemoryRecordStore::new());
    create_event(&app, EventFixture::new("open")).await;
    create_event(
        &app,
        EventFixture::new("over").status(rsvp_core::types::EventStatus::Completed),
    )
    .await;

    let (status, all) = send(&app, Method::GET, "/events", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(all.as_array().unwrap().len(), 2);

    let (status, completed) = send(&app, Method::GET, "/events?status=completed", None).await;
    assert_eq!(status, StatusCode::OK);
    let completed = completed.as_array().unwrap();
    assert_eq!(completed.len(), 1);
    assert_eq!(completed[0]["eventId"], "over");

    let (status, body) = send(&app, Method::GET, "/events?status=postponed", None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn duplicate_event_id_conflicts() {
    let app = app(&InMemoryRecordStore::new());
    create_event(&app, EventFixture::new("e1")).await;

    let body = serde_json::to_value(EventFixture::new("e1").title("Other").new_event()).unwrap();
    let (status, body) = send(&app, Method::POST, "/events", Some(body)).await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "CONFLICT");
}

#[tokio::test]
async fn invalid_event_input_is_unprocessable() {
    let app = app(&InMemoryRecordStore::new());
    let valid = serde_json::to_value(EventFixture::new("e1").new_event()).unwrap();

    let mut zero_capacity = valid.clone();
    zero_capacity["capacity"] = json!(0);
    let mut huge_capacity = valid.clone();
    huge_capacity["capacity"] = json!(100_001);
    let mut bad_status = valid.clone();
    bad_status["status"] = json!("postponed");
    let mut bad_date = valid.clone();
    bad_date["date"] = json!("next tuesday");
    let mut blank_title = valid.clone();
    blank_title["title"] = json!("   ");
    let mut missing_title = valid;
    missing_title.as_object_mut().unwrap().remove("title");

    for body in [
        zero_capacity,
        huge_capacity,
        bad_status,
        bad_date,
        blank_title,
        missing_title,
    ] {
        let (status, response) = send(&app, Method::POST, "/events", Some(body.clone())).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "accepted {body}");
        assert_eq!(response["code"], "VALIDATION_ERROR");
    }

    assert_eq!(
        send_raw(&app, Method::POST, "/events", "{not json").await,
        StatusCode::UNPROCESSABLE_ENTITY
    );

    let (status, _) = send(&app, Method::GET, "/events", None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn update_and_delete_unknown_event_are_404() {
    let app = app(&InMemoryRecordStore::new());

    let (status, _) = send(
        &app,
        Method::PATCH,
        "/events/ghost",
        Some(json!({ "title": "New" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, Method::DELETE, "/events/ghost", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// ============================================================================
// Users
// ============================================================================

#[tokio::test]
async fn user_create_get_and_conflict() {
    let app = app(&InMemoryRecordStore::new());

    let (status, created) = send(
        &app,
        Method::POST,
        "/users",
        Some(json!({ "userId": "alice", "name": "  Alice  " })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["name"], "Alice");

    let (status, fetched) = send(&app, Method::GET, "/users/alice", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, created);

    let (status, _) = send(
        &app,
        Method::POST,
        "/users",
        Some(json!({ "userId": "alice", "name": "Alice Again" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, generated) = send(&app, Method::POST, "/users", Some(json!({ "name": "Bob" }))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(generated["userId"], "id-1");

    let (status, _) = send(&app, Method::POST, "/users", Some(json!({ "name": "" }))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, _) = send(&app, Method::GET, "/users/nobody", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// ============================================================================
// Registrations
// ============================================================================

#[tokio::test]
async fn both_create_paths_admit_registrations() {
    let app = app(&InMemoryRecordStore::new());
    create_event(&app, EventFixture::new("e1").capacity(1).waitlist(true)).await;
    create_user(&app, "alice").await;
    create_user(&app, "bob").await;

    let (status, first) = register(&app, "alice", "e1").await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(first["status"], "confirmed");
    assert_eq!(first["userId"], "alice");
    assert_eq!(first["eventId"], "e1");

    let (status, second) = send(
        &app,
        Method::POST,
        "/events/e1/registrations",
        Some(json!({ "userId": "bob" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(second["status"], "waitlisted");
    assert_eq!(second["eventId"], "e1");
}

#[tokio::test]
async fn full_event_without_waitlist_rejects() {
    let store = InMemoryRecordStore::new();
    let app = app(&store);
    create_event(&app, EventFixture::new("e1").capacity(1)).await;
    create_user(&app, "alice").await;
    create_user(&app, "bob").await;

    let (status, _) = register(&app, "alice", "e1").await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = register(&app, "bob", "e1").await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], "Event is full and has no waitlist");
    assert_eq!(store.registration_count(), 1);
}

#[tokio::test]
async fn duplicate_registration_conflicts_on_either_path() {
    let app = app(&InMemoryRecordStore::new());
    create_event(&app, EventFixture::new("e1")).await;
    create_user(&app, "alice").await;

    let (status, _) = register(&app, "alice", "e1").await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = register(&app, "alice", "e1").await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], "User is already registered for this event");

    let (status, _) = send(
        &app,
        Method::POST,
        "/events/e1/registrations",
        Some(json!({ "userId": "alice" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn registration_for_unknown_records_is_404() {
    let store = InMemoryRecordStore::new();
    let app = app(&store);
    create_event(&app, EventFixture::new("e1")).await;
    create_user(&app, "alice").await;

    let (status, body) = register(&app, "ghost", "e1").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "User with id ghost not found");

    let (status, body) = register(&app, "alice", "nowhere").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Event with id nowhere not found");

    assert_eq!(store.registration_count(), 0);
}

#[tokio::test]
async fn malformed_registration_bodies_are_unprocessable() {
    let app = app(&InMemoryRecordStore::new());

    let (status, _) = send(&app, Method::POST, "/registrations", Some(json!({ "userId": "alice" }))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, _) = register(&app, "", "e1").await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    assert_eq!(
        send_raw(&app, Method::POST, "/registrations", r#"{"userId": 7, "eventId": "e1"}"#).await,
        StatusCode::UNPROCESSABLE_ENTITY
    );
}

#[tokio::test]
async fn deleting_confirmed_registration_promotes_oldest_waitlisted() {
    let store = InMemoryRecordStore::new();
    let app = app(&store);
    create_event(&app, EventFixture::new("e1").capacity(2).waitlist(true)).await;
    for user in ["a", "b", "c"] {
        create_user(&app, user).await;
    }

    assert_eq!(register(&app, "a", "e1").await.1["status"], "confirmed");
    assert_eq!(register(&app, "b", "e1").await.1["status"], "confirmed");
    let (_, waitlisted) = register(&app, "c", "e1").await;
    assert_eq!(waitlisted["status"], "waitlisted");

    let (status, body) = send(&app, Method::DELETE, "/registrations/b/e1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Registration deleted successfully");
    assert_eq!(body["removed"]["userId"], "b");
    assert_eq!(body["promoted"]["userId"], "c");
    assert_eq!(body["promoted"]["status"], "confirmed");
    assert_eq!(body["promoted"]["registeredAt"], waitlisted["registeredAt"]);

    assert_eq!(store.count("e1", RegistrationStatus::Confirmed), 2);
    assert_eq!(store.count("e1", RegistrationStatus::Waitlisted), 0);
}

#[tokio::test]
async fn event_scoped_delete_runs_the_same_promotion() {
    let app = app(&InMemoryRecordStore::new());
    create_event(&app, EventFixture::new("e1").capacity(1).waitlist(true)).await;
    for user in ["a", "b", "c"] {
        create_user(&app, user).await;
    }
    register(&app, "a", "e1").await;
    register(&app, "b", "e1").await;
    register(&app, "c", "e1").await;

    let (status, body) = send(&app, Method::DELETE, "/events/e1/registrations/a", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["promoted"]["userId"], "b");

    let (_, waitlist) = send(
        &app,
        Method::GET,
        "/events/e1/registrations?status=waitlisted",
        None,
    )
    .await;
    let waitlist = waitlist.as_array().unwrap();
    assert_eq!(waitlist.len(), 1);
    assert_eq!(waitlist[0]["userId"], "c");
}

#[tokio::test]
async fn deleting_waitlisted_or_unknown_registration() {
    let app = app(&InMemoryRecordStore::new());
    create_event(&app, EventFixture::new("e1").capacity(1).waitlist(true)).await;
    create_user(&app, "a").await;
    create_user(&app, "b").await;
    register(&app, "a", "e1").await;
    register(&app, "b", "e1").await;

    let (status, body) = send(&app, Method::DELETE, "/registrations/b/e1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["removed"]["status"], "waitlisted");
    assert_eq!(body["promoted"], Value::Null);

    let (status, body) = send(&app, Method::DELETE, "/registrations/b/e1", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Registration with id b/e1 not found");
}

#[tokio::test]
async fn no_promotion_without_waitlist() {
    let store = InMemoryRecordStore::new();
    let app = app(&store);
    create_event(&app, EventFixture::new("e1").capacity(1)).await;
    create_user(&app, "a").await;
    create_user(&app, "b").await;

    register(&app, "a", "e1").await;
    assert_eq!(register(&app, "b", "e1").await.0, StatusCode::CONFLICT);

    let (status, body) = send(&app, Method::DELETE, "/registrations/a/e1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["promoted"], Value::Null);
    assert_eq!(store.registration_count(), 0);
}

#[tokio::test]
async fn user_registrations_carry_event_titles() {
    let app = app(&InMemoryRecordStore::new());
    create_event(&app, EventFixture::new("e1").title("RustConf")).await;
    create_event(&app, EventFixture::new("e2").title("Gone Soon")).await;
    create_user(&app, "alice").await;
    register(&app, "alice", "e1").await;
    register(&app, "alice", "e2").await;
    send(&app, Method::DELETE, "/events/e2", None).await;

    let (status, body) = send(&app, Method::GET, "/users/alice/registrations", None).await;
    assert_eq!(status, StatusCode::OK);
    let mut listed = body.as_array().unwrap().clone();
    listed.sort_by_key(|r| r["eventId"].as_str().unwrap().to_string());

    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0]["eventTitle"], "RustConf");
    assert_eq!(listed[0]["status"], "confirmed");
    assert_eq!(listed[1]["eventTitle"], Value::Null);

    let (status, _) = send(&app, Method::GET, "/users/ghost/registrations", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn event_registrations_listing() {
    let app = app(&InMemoryRecordStore::new());
    create_event(&app, EventFixture::new("e1").capacity(1).waitlist(true)).await;
    for user in ["a", "b", "c"] {
        create_user(&app, user).await;
    }
    for user in ["a", "b", "c"] {
        register(&app, user, "e1").await;
    }

    let (status, all) = send(&app, Method::GET, "/events/e1/registrations", None).await;
    assert_eq!(status, StatusCode::OK);
    let users: Vec<&str> = all
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["userId"].as_str().unwrap())
        .collect();
    assert_eq!(users, ["a", "b", "c"]);

    let (_, confirmed) = send(
        &app,
        Method::GET,
        "/events/e1/registrations?status=confirmed",
        None,
    )
    .await;
    assert_eq!(confirmed.as_array().unwrap().len(), 1);

    let (status, _) = send(&app, Method::GET, "/events/e1/registrations?status=maybe", None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, _) = send(&app, Method::GET, "/events/ghost/registrations", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn client_supplied_timestamp_is_kept() {
    let app = app(&InMemoryRecordStore::new());
    create_event(&app, EventFixture::new("e1")).await;
    create_user(&app, "alice").await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/registrations",
        Some(json!({
            "userId": "alice",
            "eventId": "e1",
            "registeredAt": "2024-12-24T12:00:00Z"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["registeredAt"], "2024-12-24T12:00:00Z");
}

#[tokio::test]
async fn counter_mode_serves_the_same_contract() {
    let store = InMemoryRecordStore::new();
    let app = app_over(Arc::new(store.clone()), AdmissionMode::Counter);
    create_event(&app, EventFixture::new("e1").capacity(1).waitlist(true)).await;
    create_user(&app, "a").await;
    create_user(&app, "b").await;

    assert_eq!(register(&app, "a", "e1").await.1["status"], "confirmed");
    assert_eq!(register(&app, "b", "e1").await.1["status"], "waitlisted");

    let (_, body) = send(&app, Method::DELETE, "/registrations/a/e1", None).await;
    assert_eq!(body["promoted"]["userId"], "b");
    assert_eq!(store.seats_taken("e1"), 1);
}

// ============================================================================
// Internal failures
// ============================================================================

#[tokio::test]
async fn storage_failures_are_opaque_500s() {
    let app = app_over(
        Arc::new(FailingRecordStore::new("connection refused: password=hunter2")),
        AdmissionMode::Snapshot,
    );

    for (method, uri, body) in [
        (Method::GET, "/events", None),
        (Method::GET, "/events/e1", None),
        (Method::POST, "/users", Some(json!({ "userId": "a", "name": "A" }))),
        (
            Method::POST,
            "/registrations",
            Some(json!({ "userId": "a", "eventId": "e1" })),
        ),
        (Method::DELETE, "/registrations/a/e1", None),
    ] {
        let (status, response) = send(&app, method, uri, body).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR, "{uri}");
        assert_eq!(response["code"], "INTERNAL_SERVER_ERROR");
        assert_eq!(response["message"], "An internal error occurred");
        assert!(!response.to_string().contains("hunter2"));
    }
}
