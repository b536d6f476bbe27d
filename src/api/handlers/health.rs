//! Handler for health check endpoint.

use axum::extract::State;

use crate::api::dto::health::HealthResponse;
use crate::response::{Correlation, Reply};
use crate::state::AppState;

/// Returns service status inside the standard envelope.
///
/// # Endpoint
///
/// `GET /api/health`
///
/// # Response
///
/// ```json
/// {
///   "bizCode": "OK",
///   "message": "success",
///   "data": {
///     "status": "healthy",
///     "version": "0.1.0",
///     "locale": "zh"
///   },
///   "version": "0.1.0",
///   "requestId": "1b4e28ba-2fa1-41d2-883f-0016d3cca427"
/// }
/// ```
pub async fn health_handler(
    State(state): State<AppState>,
    correlation: Correlation,
) -> Reply<HealthResponse> {
    let response = HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION").to_string(),
        locale: state.validation.locale().as_str(),
    };

    Reply::new(correlation, state.catalog.ok.clone(), response)
}
