//! Middleware that fills the request's [`Correlation`].
//!
//! ```rust,ignore
//! let app = Router::new()
//!     .route("/api/users", post(create_user))
//!     .layer(middleware::from_fn_with_state(ApiVersion::new("1.4.0"), correlation::version_layer))
//!     .layer(middleware::from_fn(correlation::request_id_layer));
//! ```
//!
//! Every request then carries a [`Correlation`] extension that handlers read
//! with the `Correlation` extractor, and log records emitted while handling it
//! carry a `request_id` field.

use axum::{
    extract::{Request, State},
    http::{HeaderName, HeaderValue},
    middleware::Next,
    response::Response,
};
use chrono::Utc;
use std::sync::Arc;
use tracing::Instrument;
use uuid::Builder;

use crate::random::random_string;
use crate::response::Correlation;

/// Response header echoing the generated request id.
pub const REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");

/// API version stamped on every response envelope.
#[derive(Debug, Clone)]
pub struct ApiVersion(Arc<str>);

impl ApiVersion {
    pub fn new(version: impl Into<Arc<str>>) -> Self {
        Self(version.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Stores the API version in the request's [`Correlation`].
pub async fn version_layer(
    State(version): State<ApiVersion>,
    mut req: Request,
    next: Next,
) -> Response {
    update_correlation(&mut req, |correlation| {
        correlation.version = version.as_str().to_string();
    });

    next.run(req).await
}

/// Assigns a request id, records it on the request span and echoes it back.
pub async fn request_id_layer(mut req: Request, next: Next) -> Response {
    let request_id = generate_request_id();

    update_correlation(&mut req, |correlation| {
        correlation.request_id = request_id.clone();
    });

    let span = tracing::info_span!("request", request_id = %request_id);
    let mut response = next.run(req).instrument(span).await;

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }

    response
}

fn update_correlation(req: &mut Request, update: impl FnOnce(&mut Correlation)) {
    let extensions = req.extensions_mut();
    let mut correlation = extensions.remove::<Correlation>().unwrap_or_default();
    update(&mut correlation);
    extensions.insert(correlation);
}

/// Generates a random (v4) UUID request id.
///
/// If the system entropy source fails, falls back to ten pseudo-random
/// characters followed by the current Unix time in milliseconds.
pub fn generate_request_id() -> String {
    let mut bytes = [0u8; 16];

    match getrandom::fill(&mut bytes) {
        Ok(()) => Builder::from_random_bytes(bytes).into_uuid().to_string(),
        Err(err) => {
            tracing::warn!(error = %err, "Entropy unavailable, using fallback request id");
            fallback_request_id()
        }
    }
}

fn fallback_request_id() -> String {
    format!("{}{}", random_string(10), Utc::now().timestamp_millis())
}
