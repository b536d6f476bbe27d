//! HTTP middleware for request processing and observability.
//!
//! Correlation middleware (version and request id) lives in
//! [`crate::correlation`] so that it can be used outside this service.

pub mod tracing;
