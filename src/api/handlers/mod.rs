//! HTTP request handlers for API endpoints.
//!
//! Each handler module corresponds to a logical grouping of endpoints.

pub mod health;
pub mod not_found;
pub mod users;

pub use health::health_handler;
pub use not_found::not_found_handler;
pub use users::create_user_handler;
