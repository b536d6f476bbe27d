//! Data Transfer Objects for API requests and responses.
//!
//! Request DTOs derive `validator::Validate` and implement
//! [`crate::validation::Describe`] so that failures read with localized field
//! names.

pub mod health;
pub mod user;
