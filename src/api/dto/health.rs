//! DTOs for health check endpoint.

use serde::Serialize;

/// Health check payload.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: String,
    pub locale: &'static str,
}
