//! Router configuration for the RSVP service.
//!
//! Builds the complete Axum router with all endpoints.

use super::state::AppState;
use crate::api::{events, registrations, root, users};
use axum::{
    Router,
    routing::{delete, get, post},
};
use rsvp_web::handlers::health::{health_check, readiness_check};
use rsvp_web::{apply_standard_layers, fallback};

/// Build the complete Axum router.
///
/// Configures:
/// - Service banner and health checks
/// - Event management endpoints
/// - User endpoints
/// - Registration endpoints, under both the global and the event-scoped paths
///
/// Unknown routes answer with a JSON 404. The router is wrapped in the
/// standard request id, tracing and CORS layers.
pub fn build_router(state: AppState, cors_origins: &[String]) -> Router {
    let router = Router::new()
        .route("/", get(root::index))
        // Health checks
        .route("/health", get(health_check))
        .route("/ready", get(readiness_check))
        // Event management
        .route("/events", post(events::create_event).get(events::list_events))
        .route(
            "/events/:event_id",
            get(events::get_event)
                .put(events::update_event)
                .patch(events::update_event)
                .delete(events::delete_event),
        )
        // Event-scoped registrations
        .route(
            "/events/:event_id/registrations",
            post(registrations::register_for_event).get(registrations::list_event_registrations),
        )
        .route(
            "/events/:event_id/registrations/:user_id",
            delete(registrations::cancel_for_event),
        )
        // Users
        .route("/users", post(users::create_user))
        .route("/users/:user_id", get(users::get_user))
        .route(
            "/users/:user_id/registrations",
            get(registrations::list_user_registrations),
        )
        // Global registrations
        .route("/registrations", post(registrations::create_registration))
        .route(
            "/registrations/:user_id/:event_id",
            delete(registrations::delete_registration),
        )
        .fallback(fallback)
        .with_state(state);

    apply_standard_layers(router, cors_origins)
}
