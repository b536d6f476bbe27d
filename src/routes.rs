//! Top-level router configuration.
//!
//! # Route Structure
//!
//! - `/api/*` - REST API ([`crate::api::routes`])
//! - anything else - `404` envelope
//!
//! # Middleware
//!
//! - **Tracing** - Structured request/response logging
//! - **Request id** - Generated per request, echoed in `x-request-id`
//! - **Version** - Configured API version stamped on every envelope
//! - **Body limit** - Maximum size accepted by the JSON body extractor

use axum::{Extension, Router, middleware};
use tower::ServiceBuilder;

use crate::api;
use crate::api::handlers::not_found_handler;
use crate::api::middleware::tracing;
use crate::config::Config;
use crate::correlation::{self, ApiVersion};
use crate::response::BodyLimit;
use crate::state::AppState;

/// Constructs the application router with all routes and middleware.
pub fn app_router(state: AppState, config: &Config) -> Router {
    Router::new()
        .nest("/api", api::routes::api_routes())
        .fallback(not_found_handler)
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(tracing::layer())
                .layer(middleware::from_fn(correlation::request_id_layer))
                .layer(middleware::from_fn_with_state(
                    ApiVersion::new(config.app_version.as_str()),
                    correlation::version_layer,
                ))
                .layer(Extension(BodyLimit(config.read_json_max_bytes))),
        )
}
