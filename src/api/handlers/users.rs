//! Handler for user registration.

use axum::extract::State;

use crate::api::dto::user::{CreateUserRequest, UserResponse};
use crate::response::{Correlation, JsonBody, ReadJsonError, Reply};
use crate::state::AppState;

/// Registers a user.
///
/// # Endpoint
///
/// `POST /api/users`
///
/// # Request Body
///
/// ```json
/// {
///   "name": "张三",
///   "email": "zhangsan@example.com",
///   "phone": "13800138000",
///   "age": 30
/// }
/// ```
///
/// # Response Codes
///
/// - **201 Created** (`CREATED`): user registered, `data` holds the user
/// - **400 Bad Request** (`INVALID_BODY`): body is empty, malformed or unreadable
/// - **413 Payload Too Large** (`BODY_TOO_LARGE`): body above the configured
///   limit, `message` names the limit in MB
/// - **409 Conflict** (`USER_EXISTS`): email already registered
/// - **422 Unprocessable Entity** (`VALIDATION_FAILED`): field rules failed,
///   `message` lists every failure in the configured locale
pub async fn create_user_handler(
    State(state): State<AppState>,
    correlation: Correlation,
    body: Result<JsonBody<CreateUserRequest>, ReadJsonError>,
) -> Reply<Option<UserResponse>> {
    let catalog = &state.catalog;

    let payload = match body {
        Ok(JsonBody(payload)) => payload,
        Err(err) => {
            tracing::debug!(error = %err, "Rejected request body");
            let entry = match err {
                ReadJsonError::TooLarge { .. } => &catalog.body_too_large,
                _ => &catalog.invalid_body,
            };
            let message = err.to_string();
            return Reply::new(correlation, entry.with_cause(err, &[&message]), None);
        }
    };

    if let Err(err) = state.validation.check_struct(&payload) {
        tracing::debug!(error = %err, "Validation failed");
        let message = err.to_string();
        let error = catalog.validation_failed.with_cause(err, &[&message]);
        return Reply::new(correlation, error, None);
    }

    match state
        .users
        .insert(payload.name, payload.email, payload.phone)
    {
        Some(user) => {
            tracing::info!(user_id = user.id, "User registered");
            Reply::new(correlation, catalog.created.clone(), Some(user))
        }
        None => Reply::new(correlation, catalog.user_exists.clone(), None),
    }
}
