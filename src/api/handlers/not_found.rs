//! Fallback for unmatched routes.

use axum::http::StatusCode;

use crate::error::ApiError;
use crate::response::{Correlation, Reply};

/// Answers unknown paths with the standard envelope and business code `"404"`.
pub async fn not_found_handler(correlation: Correlation) -> Reply<()> {
    let status = StatusCode::NOT_FOUND;
    let error = ApiError::from_status(status, status.canonical_reason().unwrap_or("Not Found"));
    Reply::new(correlation, error, ())
}
