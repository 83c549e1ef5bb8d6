//! Event management API endpoints.
//!
//! Provides CRUD operations for events:
//! - POST /events - Create a new event
//! - GET /events/:event_id - Get event details
//! - GET /events - List events, optionally filtered by status
//! - PUT or PATCH /events/:event_id - Partially update an event
//! - DELETE /events/:event_id - Delete an event (registrations are kept)

use super::MessageResponse;
use crate::server::state::AppState;
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use rsvp_core::types::{Event, EventId, EventPatch, EventStatus, NewEvent};
use rsvp_web::{AppError, ValidJson, ValidQuery};
use serde::Deserialize;

/// Query parameters for listing events.
#[derive(Debug, Default, Deserialize)]
pub struct ListEventsQuery {
    /// Filter by status
    pub status: Option<EventStatus>,
}

/// Create a new event.
///
/// `eventId` is optional; a UUID is generated when it is missing.
///
/// # Example
///
/// ```bash
/// curl -X POST http://localhost:8080/events \
///   -H "Content-Type: application/json" \
///   -d '{
///     "title": "Rust Meetup",
///     "description": "Monthly meetup",
///     "date": "2025-06-01T18:00:00Z",
///     "location": "Main Hall",
///     "capacity": 50,
///     "organizer": "Rust Users Group",
///     "hasWaitlist": true
///   }'
/// ```
///
/// # Errors
///
/// - 409: the event id is taken
/// - 422: a field is missing or invalid
pub async fn create_event(
    State(state): State<AppState>,
    ValidJson(input): ValidJson<NewEvent>,
) -> Result<(StatusCode, Json<Event>), AppError> {
    let event = state.events.create_event(input).await?;
    Ok((StatusCode::CREATED, Json(event)))
}

/// Get event details by ID.
///
/// # Errors
///
/// - 404: unknown event
pub async fn get_event(
    State(state): State<AppState>,
    Path(event_id): Path<EventId>,
) -> Result<Json<Event>, AppError> {
    Ok(Json(state.events.get_event(event_id).await?))
}

/// List events.
///
/// # Example
///
/// ```bash
/// curl http://localhost:8080/events?status=active
/// ```
///
/// # Errors
///
/// - 422: unknown status value
pub async fn list_events(
    State(state): State<AppState>,
    ValidQuery(query): ValidQuery<ListEventsQuery>,
) -> Result<Json<Vec<Event>>, AppError> {
    Ok(Json(state.events.list_events(query.status).await?))
}

/// Update the fields present in the body; absent fields keep their value.
///
/// # Errors
///
/// - 404: unknown event
/// - 422: a supplied field is invalid
pub async fn update_event(
    State(state): State<AppState>,
    Path(event_id): Path<EventId>,
    ValidJson(patch): ValidJson<EventPatch>,
) -> Result<Json<Event>, AppError> {
    Ok(Json(state.events.update_event(event_id, patch).await?))
}

/// Delete an event.
///
/// # Errors
///
/// - 404: unknown event
pub async fn delete_event(
    State(state): State<AppState>,
    Path(event_id): Path<EventId>,
) -> Result<Json<MessageResponse>, AppError> {
    state.events.delete_event(event_id).await?;
    Ok(Json(MessageResponse::new("Event deleted successfully")))
}
