//! Reading JSON request bodies with a size cap and client-friendly failures.

use axum::{
    body::Body,
    extract::{FromRequest, Request},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use http_body_util::LengthLimitError;
use serde::de::DeserializeOwned;
use serde_json::error::Category;
use std::error::Error as StdError;
use thiserror::Error;

use crate::error::ApiError;

/// Default maximum request body size (2 MiB).
pub const DEFAULT_BODY_LIMIT: usize = 2 << 20;

const KIB: usize = 1 << 10;
const MIB: usize = 1 << 20;

/// Why a JSON body could not be read.
///
/// The messages are safe to show to clients. Unexpected failures are logged
/// with detail and reported as [`ReadJsonError::Unknown`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReadJsonError {
    #[error("malformed JSON body")]
    Malformed,

    #[error("body must not be empty")]
    Empty,

    #[error("body exceeds {}", size_text(.limit))]
    TooLarge { limit: usize },

    #[error("unknown error, check parameters")]
    Unknown,
}

impl ReadJsonError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::TooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            _ => StatusCode::BAD_REQUEST,
        }
    }
}

/// Human-readable size: whole MB, one-decimal MB, whole KB, or bytes.
fn size_text(bytes: &usize) -> String {
    let bytes = *bytes;
    if bytes >= MIB && bytes % MIB == 0 {
        format!("{} MB", bytes / MIB)
    } else if bytes >= MIB {
        format!("{:.1} MB", bytes as f64 / MIB as f64)
    } else if bytes >= KIB && bytes % KIB == 0 {
        format!("{} KB", bytes / KIB)
    } else {
        format!("{bytes} bytes")
    }
}

impl From<ReadJsonError> for ApiError {
    fn from(err: ReadJsonError) -> Self {
        ApiError::from_status(err.status(), err.to_string())
    }
}

impl IntoResponse for ReadJsonError {
    fn into_response(self) -> Response {
        ApiError::from(self).into_response()
    }
}

/// Decodes the first JSON value in `bytes`. Trailing data is ignored.
///
/// # Errors
///
/// - [`ReadJsonError::Empty`] if `bytes` holds only whitespace
/// - [`ReadJsonError::Malformed`] on a syntax error or truncated input
/// - [`ReadJsonError::Unknown`] if the value does not fit `T`
pub fn decode_json<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, ReadJsonError> {
    let mut stream = serde_json::Deserializer::from_slice(bytes).into_iter::<T>();

    match stream.next() {
        None => Err(ReadJsonError::Empty),
        Some(Ok(value)) => Ok(value),
        Some(Err(err)) => Err(classify(err)),
    }
}

fn classify(err: serde_json::Error) -> ReadJsonError {
    match err.classify() {
        Category::Syntax | Category::Eof => ReadJsonError::Malformed,
        Category::Data | Category::Io => {
            tracing::warn!(error = %err, "Unexpected JSON decode failure");
            ReadJsonError::Unknown
        }
    }
}

/// Collects at most `limit` bytes from `body` and decodes them as `T`.
///
/// # Errors
///
/// Returns [`ReadJsonError::TooLarge`] once the body grows past `limit`, plus
/// every error of [`decode_json`].
pub async fn read_json<T: DeserializeOwned>(body: Body, limit: usize) -> Result<T, ReadJsonError> {
    let bytes = match axum::body::to_bytes(body, limit).await {
        Ok(bytes) => bytes,
        Err(err) if exceeds_limit(&err) => return Err(ReadJsonError::TooLarge { limit }),
        Err(err) => {
            tracing::warn!(error = %err, "Failed to read request body");
            return Err(ReadJsonError::Unknown);
        }
    };

    decode_json(&bytes)
}

fn exceeds_limit(err: &axum::Error) -> bool {
    let mut current: Option<&(dyn StdError + 'static)> = Some(err);
    while let Some(err) = current {
        if err.is::<LengthLimitError>() {
            return true;
        }
        current = err.source();
    }
    false
}

/// Maximum body size for [`JsonBody`], installed as a request extension.
///
/// ```rust,ignore
/// let app = Router::new()
///     .route("/users", post(create_user))
///     .layer(Extension(BodyLimit(1 << 20)));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BodyLimit(pub usize);

impl Default for BodyLimit {
    fn default() -> Self {
        Self(DEFAULT_BODY_LIMIT)
    }
}

/// Extractor that reads the request body with [`read_json`].
///
/// Unlike `axum::Json` it does not look at `Content-Type`, and its rejection
/// is a [`ReadJsonError`] that renders as the standard envelope.
#[derive(Debug, Clone)]
pub struct JsonBody<T>(pub T);

impl<S, T> FromRequest<S> for JsonBody<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Send,
{
    type Rejection = ReadJsonError;

    async fn from_request(req: Request, _state: &S) -> Result<Self, Self::Rejection> {
        let limit = req
            .extensions()
            .get::<BodyLimit>()
            .copied()
            .unwrap_or_default();

        read_json(req.into_body(), limit.0).await.map(JsonBody)
    }
}
