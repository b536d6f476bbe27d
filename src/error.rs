//! Application errors carrying a business code, an HTTP status and a cause chain.
//!
//! Every distinct failure kind of an application is registered once, usually at
//! startup, through a [`BizCodeRegistry`]. The resulting [`ApiError`] values form
//! the application's catalog. Handlers never mutate catalog entries: they derive
//! new values with [`ApiError::with_message`] and [`ApiError::with_cause`], so a
//! single entry can be shared by every request.
//!
//! ```rust,ignore
//! let registry = BizCodeRegistry::new();
//! let not_found = registry.register(StatusCode::NOT_FOUND, "USER_NOT_FOUND", "user not found");
//!
//! // Per-request decoration keeps the business code and status.
//! let err = not_found.with_cause(io_error, &[]);
//! assert_eq!(err.biz_code(), "USER_NOT_FOUND");
//! ```

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::collections::HashSet;
use std::error::Error as StdError;
use std::fmt;
use std::sync::{Arc, Mutex, OnceLock, PoisonError};

use crate::response::{BufferedResponse, Correlation, write_json};

/// Boxed error accepted by [`ApiError::with_cause`].
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

type SharedCause = Arc<dyn StdError + Send + Sync + 'static>;

/// Ordered sequence of underlying faults, oldest first.
#[derive(Clone, Default)]
pub struct CauseChain {
    causes: Vec<SharedCause>,
}

impl CauseChain {
    fn push(&mut self, cause: SharedCause) {
        self.causes.push(cause);
    }

    fn extend(&mut self, other: &CauseChain) {
        self.causes.extend(other.causes.iter().cloned());
    }

    pub fn len(&self) -> usize {
        self.causes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.causes.is_empty()
    }

    /// Iterates over the causes in the order they were attached.
    pub fn iter(&self) -> impl Iterator<Item = &(dyn StdError + Send + Sync + 'static)> {
        self.causes.iter().map(|cause| cause.as_ref())
    }

    /// The first cause ever attached.
    pub fn root(&self) -> Option<&(dyn StdError + Send + Sync + 'static)> {
        self.causes.first().map(|cause| cause.as_ref())
    }

    /// The most recently attached cause.
    pub fn last(&self) -> Option<&(dyn StdError + Send + Sync + 'static)> {
        self.causes.last().map(|cause| cause.as_ref())
    }
}

impl fmt::Display for CauseChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, cause) in self.causes.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{cause}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for CauseChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.causes.iter().map(|cause| cause.to_string()))
            .finish()
    }
}

impl StdError for CauseChain {}

/// An application-level error: business code, user-facing message, HTTP status
/// and an optional chain of technical causes.
///
/// Only `biz_code` and `message` ever reach the client. The cause chain is kept
/// for logs and diagnostics.
#[derive(Debug, Clone)]
pub struct ApiError {
    message: String,
    biz_code: String,
    status: StatusCode,
    cause: Option<CauseChain>,
}

impl ApiError {
    /// Registers `biz_code` in the process-wide registry and builds the error.
    ///
    /// # Panics
    ///
    /// Panics if `biz_code` is already registered in [`BizCodeRegistry::global`].
    pub fn new(status: StatusCode, biz_code: impl Into<String>, message: impl Into<String>) -> Self {
        BizCodeRegistry::global().register(status, biz_code, message)
    }

    /// Built-in 500 error used when no catalog entry is available.
    ///
    /// Its business code is `"500"` and it is not registered anywhere.
    pub fn internal(cause: impl Into<BoxError>) -> Self {
        let status = StatusCode::INTERNAL_SERVER_ERROR;
        Self::from_status(status, status.canonical_reason().unwrap_or("Internal Server Error"))
            .with_cause(cause, &[])
    }

    /// Unregistered error whose business code is the numeric status.
    pub fn from_status(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            biz_code: status.as_u16().to_string(),
            status,
            cause: None,
        }
    }

    pub fn biz_code(&self) -> &str {
        &self.biz_code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn cause(&self) -> Option<&CauseChain> {
        self.cause.as_ref()
    }

    /// Returns a copy with `message` replaced.
    pub fn with_message(&self, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..self.clone()
        }
    }

    /// Returns a copy with `err` appended to the cause chain.
    ///
    /// When `err` is itself an [`ApiError`], only its cause chain is carried
    /// over; its business code, status and message are dropped. A non-empty
    /// `messages` replaces the message with the entries joined by `,`.
    pub fn with_cause(&self, err: impl Into<BoxError>, messages: &[&str]) -> Self {
        let mut chain = self.cause.clone().unwrap_or_default();

        match err.into().downcast::<ApiError>() {
            Ok(api_error) => {
                if let Some(inner) = &api_error.cause {
                    chain.extend(inner);
                }
            }
            Err(other) => chain.push(Arc::from(other)),
        }

        let message = if messages.is_empty() {
            self.message.clone()
        } else {
            messages.join(",")
        };

        Self {
            message,
            biz_code: self.biz_code.clone(),
            status: self.status,
            cause: (!chain.is_empty()).then_some(chain),
        }
    }

    /// Finds the first cause of type `E`, searching each cause's own source chain.
    pub fn find_cause<E: StdError + 'static>(&self) -> Option<&E> {
        let chain = self.cause.as_ref()?;
        chain.iter().find_map(|cause| {
            let mut current: Option<&(dyn StdError + 'static)> = Some(cause);
            while let Some(err) = current {
                if let Some(found) = err.downcast_ref::<E>() {
                    return Some(found);
                }
                current = err.source();
            }
            None
        })
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.cause {
            Some(cause) => write!(
                f,
                "[statusCode: {}, bizCode: {}, message: {}, cause: {}]",
                self.status.as_u16(),
                self.biz_code,
                self.message,
                cause
            ),
            None => write!(
                f,
                "[statusCode: {}, bizCode: {}, message: {}]",
                self.status.as_u16(),
                self.biz_code,
                self.message
            ),
        }
    }
}

impl StdError for ApiError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        let chain = self.cause.as_ref()?;
        Some(chain)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }

        let mut out = BufferedResponse::default();
        if let Some(residual) = write_json(
            &mut out,
            &Correlation::default(),
            Some(&self),
            &serde_json::Value::Null,
            &[],
        ) {
            tracing::error!(error = %residual, "Failed to render error response");
        }
        out.into_response()
    }
}

/// Catalog of registered business codes.
///
/// A code can be registered once per registry. Registration normally happens
/// at startup, before any request is served.
#[derive(Debug, Default)]
pub struct BizCodeRegistry {
    codes: Mutex<HashSet<String>>,
}

impl BizCodeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide registry used by [`ApiError::new`].
    pub fn global() -> &'static BizCodeRegistry {
        static GLOBAL: OnceLock<BizCodeRegistry> = OnceLock::new();
        GLOBAL.get_or_init(BizCodeRegistry::new)
    }

    /// Registers `biz_code` and returns the catalog entry for it.
    ///
    /// # Panics
    ///
    /// Panics if `biz_code` was already registered.
    pub fn register(
        &self,
        status: StatusCode,
        biz_code: impl Into<String>,
        message: impl Into<String>,
    ) -> ApiError {
        let biz_code = biz_code.into();

        let inserted = self
            .codes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(biz_code.clone());

        if !inserted {
            panic!("bizCode({biz_code}) already exist, please replace it");
        }

        tracing::debug!(biz_code = %biz_code, status = status.as_u16(), "Registered business code");

        ApiError {
            message: message.into(),
            biz_code,
            status,
            cause: None,
        }
    }

    pub fn contains(&self, biz_code: &str) -> bool {
        self.codes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(biz_code)
    }

    pub fn len(&self) -> usize {
        self.codes.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
