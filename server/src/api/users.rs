//! User API endpoints.
//!
//! - POST /users - Create a user
//! - GET /users/:user_id - Get a user

use crate::server::state::AppState;
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use rsvp_core::types::{NewUser, User, UserId};
use rsvp_web::{AppError, ValidJson};

/// Create a user.
///
/// # Errors
///
/// - 409: the user id is taken
/// - 422: missing or invalid name
pub async fn create_user(
    State(state): State<AppState>,
    ValidJson(input): ValidJson<NewUser>,
) -> Result<(StatusCode, Json<User>), AppError> {
    let user = state.users.create_user(input).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// Get a user by ID.
///
/// # Errors
///
/// - 404: unknown user
pub async fn get_user(
    State(state): State<AppState>,
    Path(user_id): Path<UserId>,
) -> Result<Json<User>, AppError> {
    Ok(Json(state.users.get_user(user_id).await?))
}
