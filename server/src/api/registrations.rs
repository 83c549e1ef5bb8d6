//! Registration API endpoints.
//!
//! Registrations are reachable under two addressing schemes that run the same
//! lifecycle logic:
//! - POST /registrations (`userId` and `eventId` in the body)
//! - POST /events/:event_id/registrations (`userId` in the body)
//! - DELETE /registrations/:user_id/:event_id
//! - DELETE /events/:event_id/registrations/:user_id
//!
//! Listings:
//! - GET /users/:user_id/registrations (with event titles)
//! - GET /events/:event_id/registrations?status=

use crate::server::state::AppState;
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use rsvp_core::types::{
    EventId, Registration, RegistrationRemoval, RegistrationRequest, RegistrationStatus, UserId,
    UserRegistration,
};
use rsvp_web::{AppError, ValidJson, ValidQuery};
use serde::{Deserialize, Serialize};

// ============================================================================
// Request/Response Types
// ============================================================================

/// Body of `POST /registrations`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRegistrationBody {
    /// User to register
    pub user_id: UserId,
    /// Event to register for
    pub event_id: EventId,
    /// Admission time supplied by the caller (server clock when absent)
    #[serde(default)]
    pub registered_at: Option<DateTime<Utc>>,
}

/// Body of `POST /events/:event_id/registrations`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventRegistrationBody {
    /// User to register
    pub user_id: UserId,
    /// Admission time supplied by the caller (server clock when absent)
    #[serde(default)]
    pub registered_at: Option<DateTime<Utc>>,
}

/// Query parameters for listing an event's registrations.
#[derive(Debug, Default, Deserialize)]
pub struct ListRegistrationsQuery {
    /// Filter by status
    pub status: Option<RegistrationStatus>,
}

/// Body returned by both delete paths.
#[derive(Debug, Serialize)]
pub struct DeleteRegistrationResponse {
    /// Human-readable message
    pub message: &'static str,
    /// Removed registration and the promotion it triggered
    #[serde(flatten)]
    pub outcome: RegistrationRemoval,
}

// ============================================================================
// Handlers
// ============================================================================

/// Register a user for an event named in the body.
///
/// # Example
///
/// ```bash
/// curl -X POST http://localhost:8080/registrations \
///   -H "Content-Type: application/json" \
///   -d '{"userId": "alice", "eventId": "rust-meetup"}'
/// ```
///
/// # Errors
///
/// - 404: unknown user or event
/// - 409: already registered, or the event is full without a waitlist
/// - 422: missing or empty identifiers
pub async fn create_registration(
    State(state): State<AppState>,
    ValidJson(body): ValidJson<CreateRegistrationBody>,
) -> Result<(StatusCode, Json<Registration>), AppError> {
    register(
        &state,
        RegistrationRequest {
            user_id: body.user_id,
            event_id: body.event_id,
            registered_at: body.registered_at,
        },
    )
    .await
}

/// Register a user for the event in the path.
///
/// # Errors
///
/// Same as [`create_registration`].
pub async fn register_for_event(
    State(state): State<AppState>,
    Path(event_id): Path<EventId>,
    ValidJson(body): ValidJson<EventRegistrationBody>,
) -> Result<(StatusCode, Json<Registration>), AppError> {
    register(
        &state,
        RegistrationRequest {
            user_id: body.user_id,
            event_id,
            registered_at: body.registered_at,
        },
    )
    .await
}

/// Delete a registration addressed as `/registrations/:user_id/:event_id`.
///
/// Deleting a confirmed registration promotes the oldest waitlisted one.
///
/// # Errors
///
/// - 404: unknown registration
pub async fn delete_registration(
    State(state): State<AppState>,
    Path((user_id, event_id)): Path<(UserId, EventId)>,
) -> Result<Json<DeleteRegistrationResponse>, AppError> {
    unregister(&state, user_id, event_id).await
}

/// Delete a registration addressed as `/events/:event_id/registrations/:user_id`.
///
/// # Errors
///
/// Same as [`delete_registration`].
pub async fn cancel_for_event(
    State(state): State<AppState>,
    Path((event_id, user_id)): Path<(EventId, UserId)>,
) -> Result<Json<DeleteRegistrationResponse>, AppError> {
    unregister(&state, user_id, event_id).await
}

/// List a user's registrations with event titles.
///
/// # Errors
///
/// - 404: unknown user
pub async fn list_user_registrations(
    State(state): State<AppState>,
    Path(user_id): Path<UserId>,
) -> Result<Json<Vec<UserRegistration>>, AppError> {
    Ok(Json(
        state.registrations.list_user_registrations(user_id).await?,
    ))
}

/// List an event's registrations in waitlist order.
///
/// # Errors
///
/// - 404: unknown event
/// - 422: unknown status value
pub async fn list_event_registrations(
    State(state): State<AppState>,
    Path(event_id): Path<EventId>,
    ValidQuery(query): ValidQuery<ListRegistrationsQuery>,
) -> Result<Json<Vec<Registration>>, AppError> {
    Ok(Json(
        state
            .registrations
            .list_event_registrations(event_id, query.status)
            .await?,
    ))
}

async fn register(
    state: &AppState,
    request: RegistrationRequest,
) -> Result<(StatusCode, Json<Registration>), AppError> {
    let registration = state.registrations.create_registration(request).await?;
    Ok((StatusCode::CREATED, Json(registration)))
}

async fn unregister(
    state: &AppState,
    user_id: UserId,
    event_id: EventId,
) -> Result<Json<DeleteRegistrationResponse>, AppError> {
    let outcome = state
        .registrations
        .delete_registration(user_id, event_id)
        .await?;
    Ok(Json(DeleteRegistrationResponse {
        message: "Registration deleted successfully",
        outcome,
    }))
}
