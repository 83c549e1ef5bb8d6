//! Custom Axum extractors.
//!
//! Axum's stock `Json` and `Query` extractors reject bad input with plain-text
//! 400/415 responses. These wrappers report every such rejection as a
//! 422 `VALIDATION_ERROR` JSON body instead:
//! - `ValidJson`: JSON request body
//! - `ValidQuery`: query string
//!
//! # Examples
//!
//! ```ignore
//! use rsvp_web::extractors::{ValidJson, ValidQuery};
//!
//! async fn create_event(
//!     State(state): State<AppState>,
//!     ValidJson(input): ValidJson<NewEvent>,
//! ) -> Result<(StatusCode, Json<Event>), AppError> {
//!     let event = state.events.create_event(input).await?;
//!     Ok((StatusCode::CREATED, Json(event)))
//! }
//! ```

use crate::error::AppError;
use axum::{
    Json, async_trait,
    extract::{FromRequest, FromRequestParts, Query, Request},
    http::request::Parts,
};
use serde::de::DeserializeOwned;

/// JSON body whose rejections become 422 responses.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ValidJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(Self(value))
    }
}

/// Query string whose rejections become 422 responses.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidQuery<T>(pub T);

#[async_trait]
impl<S, T> FromRequestParts<S> for ValidQuery<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state).await?;
        Ok(Self(value))
    }
}
