//! # API Kit
//!
//! Building blocks for JSON services on Axum, plus a small demo service that
//! wires them together.
//!
//! ## Building Blocks
//!
//! - **Errors** ([`error`]) - [`ApiError`] with business codes that are unique
//!   per [`BizCodeRegistry`], and a chain of technical causes
//! - **Validation** ([`validation`]) - rule checking on top of `validator`
//!   with zh/en messages, localized field names and a built-in `phone` rule
//! - **Envelope** ([`response`]) - reading JSON request bodies with a size
//!   limit, and writing every response as
//!   `{bizCode, message, data, version, requestId}`
//! - **Correlation** ([`correlation`]) - middleware that assigns request ids
//!   and stamps the API version
//! - **Random** ([`random`]) - random integers and strings
//!
//! ## Demo Service
//!
//! [`server::run`] serves `GET /api/health` and `POST /api/users` using the
//! pieces above. Configuration comes from environment variables, see
//! [`config`].
//!
//! ```bash
//! APP_LOCALE=en LISTEN=127.0.0.1:3000 cargo run
//! ```

pub mod api;
pub mod catalog;
pub mod config;
pub mod correlation;
pub mod error;
pub mod random;
pub mod response;
pub mod routes;
pub mod server;
pub mod state;
pub mod telemetry;
pub mod validation;

pub use error::{ApiError, BizCodeRegistry};
pub use state::AppState;

/// Commonly used types for external consumers.
///
/// Re-exports frequently used types to simplify imports for library users
/// and integration tests.
pub mod prelude {
    pub use crate::correlation::{ApiVersion, request_id_layer, version_layer};
    pub use crate::error::{ApiError, BizCodeRegistry, CauseChain};
    pub use crate::response::{
        BodyLimit, Correlation, Envelope, JsonBody, ReadJsonError, Reply, read_json, write_json,
    };
    pub use crate::validation::{
        CheckError, CustomRule, Describe, FieldMeta, Locale, ValidationCell, ValidationEngine,
    };
}
