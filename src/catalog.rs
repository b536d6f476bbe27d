//! Business-code catalog of the demo service.

use axum::http::StatusCode;

use crate::error::{ApiError, BizCodeRegistry};

/// Every business error the service can answer with.
///
/// Built once at startup; handlers derive per-request values from these
/// entries with [`ApiError::with_message`] and [`ApiError::with_cause`].
#[derive(Debug, Clone)]
pub struct Catalog {
    pub ok: ApiError,
    pub created: ApiError,
    pub invalid_body: ApiError,
    pub body_too_large: ApiError,
    pub validation_failed: ApiError,
    pub user_exists: ApiError,
}

impl Catalog {
    /// Registers all catalog entries in `registry`.
    ///
    /// # Panics
    ///
    /// Panics if any code is already present in `registry`.
    pub fn register(registry: &BizCodeRegistry) -> Self {
        Self {
            ok: registry.register(StatusCode::OK, "OK", "success"),
            created: registry.register(StatusCode::CREATED, "CREATED", "created"),
            invalid_body: registry.register(
                StatusCode::BAD_REQUEST,
                "INVALID_BODY",
                "invalid request body",
            ),
            body_too_large: registry.register(
                StatusCode::PAYLOAD_TOO_LARGE,
                "BODY_TOO_LARGE",
                "request body too large",
            ),
            validation_failed: registry.register(
                StatusCode::UNPROCESSABLE_ENTITY,
                "VALIDATION_FAILED",
                "validation failed",
            ),
            user_exists: registry.register(
                StatusCode::CONFLICT,
                "USER_EXISTS",
                "user already exists",
            ),
        }
    }
}
