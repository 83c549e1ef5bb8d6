//! Standard tower layer stack for request tracking and observability.
//!
//! Every router gets, outermost first:
//! - **Request id**: reuse the client's `x-request-id` or generate a UUID
//! - **Tracing**: one span per request carrying method, URI and request id
//! - **Propagation**: echo `x-request-id` on the response
//! - **CORS**: from the configured origin list
//!
//! # Example
//!
//! ```ignore
//! use rsvp_web::layers::{apply_standard_layers, fallback};
//!
//! let app = apply_standard_layers(
//!     Router::new().route("/events", get(list_events)).fallback(fallback),
//!     &["https://example.com".to_string()],
//! );
//! ```

use crate::error::AppError;
use axum::{
    Router,
    body::Body,
    http::{HeaderName, HeaderValue, Request, Uri},
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

/// Header carrying the request id.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Build the CORS layer for `origins`.
///
/// An empty list or a `*` entry allows any origin. Entries that are not valid
/// header values are skipped with a warning.
#[must_use]
pub fn cors_layer(origins: &[String]) -> CorsLayer {
    let base = CorsLayer::new().allow_methods(Any).allow_headers(Any);

    if origins.is_empty() || origins.iter().any(|o| o == "*") {
        return base.allow_origin(Any);
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    base.allow_origin(AllowOrigin::list(allowed))
}

/// Wrap `router` in the request id, tracing, and CORS layers.
pub fn apply_standard_layers<S>(router: Router<S>, cors_origins: &[String]) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    let request_id = HeaderName::from_static(REQUEST_ID_HEADER);

    let trace = TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
        let request_id = request
            .headers()
            .get(REQUEST_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("-");
        tracing::info_span!(
            "http_request",
            method = %request.method(),
            uri = %request.uri(),
            request_id = %request_id,
        )
    });

    router.layer(
        ServiceBuilder::new()
            .layer(SetRequestIdLayer::new(request_id.clone(), MakeRequestUuid))
            .layer(trace)
            .layer(PropagateRequestIdLayer::new(request_id))
            .layer(cors_layer(cors_origins)),
    )
}

/// Fallback handler: unknown routes get a JSON 404.
#[allow(clippy::unused_async)]
pub async fn fallback(uri: Uri) -> AppError {
    AppError::route_not_found(uri.path())
}
