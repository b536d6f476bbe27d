//! API route configuration.

use axum::{
    Router,
    routing::{get, post},
};

use crate::api::handlers::{create_user_handler, health_handler};
use crate::state::AppState;

/// All API routes, mounted under `/api`.
///
/// # Endpoints
///
/// - `GET  /health` - Service status
/// - `POST /users`  - Register a user
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_handler))
        .route("/users", post(create_user_handler))
}
