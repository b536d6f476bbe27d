//! JSON response envelope and request/response body helpers.
//!
//! Every response leaves the service in the same shape:
//!
//! ```json
//! {
//!   "bizCode": "OK",
//!   "message": "success",
//!   "data": { "id": 1 },
//!   "version": "1.2.0",
//!   "requestId": "5f0c…"
//! }
//! ```
//!
//! `version` and `requestId` come from the request's [`Correlation`] and are
//! omitted when empty.

mod read;
mod write;

pub use read::{BodyLimit, DEFAULT_BODY_LIMIT, JsonBody, ReadJsonError, decode_json, read_json};
pub use write::{BufferedResponse, Reply, ResponseSink, STATUS_HEADER, write_json};

use axum::{extract::FromRequestParts, http::request::Parts};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;

/// Request-scoped values used to correlate a response with its request.
///
/// Populated by [`crate::correlation`] middleware. Missing values are empty
/// strings rather than errors.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Correlation {
    pub version: String,
    pub request_id: String,
}

impl<S> FromRequestParts<S> for Correlation
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts.extensions.get::<Correlation>().cloned().unwrap_or_default())
    }
}

/// The JSON envelope written for every response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope<T> {
    pub biz_code: String,
    pub message: String,
    pub data: T,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub version: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub request_id: String,
}

impl<T> Envelope<T> {
    pub fn new(
        data: T,
        biz_code: impl Into<String>,
        message: impl Into<String>,
        version: impl Into<String>,
        request_id: impl Into<String>,
    ) -> Self {
        Self {
            biz_code: biz_code.into(),
            message: message.into(),
            data,
            version: version.into(),
            request_id: request_id.into(),
        }
    }

    /// Builds an envelope, taking `version` and `requestId` from `correlation`.
    pub fn from_correlation(
        correlation: &Correlation,
        data: T,
        biz_code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::new(
            data,
            biz_code,
            message,
            correlation.version.clone(),
            correlation.request_id.clone(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;
    use serde_json::json;

    #[test]
    fn test_envelope_omits_empty_correlation() {
        let envelope =
            Envelope::from_correlation(&Correlation::default(), json!([1, 2]), "OK", "success");

        let value = serde_json::to_value(&envelope).unwrap();

        assert_eq!(value, json!({"bizCode": "OK", "message": "success", "data": [1, 2]}));
    }

    #[test]
    fn test_envelope_includes_correlation() {
        let correlation = Correlation {
            version: "1.0.0".to_string(),
            request_id: "req-1".to_string(),
        };

        let envelope = Envelope::from_correlation(&correlation, (), "OK", "success");
        let value = serde_json::to_value(&envelope).unwrap();

        assert_eq!(value["version"], "1.0.0");
        assert_eq!(value["requestId"], "req-1");
        assert!(value["data"].is_null());
    }

    #[tokio::test]
    async fn test_correlation_defaults_when_absent() {
        let (mut parts, _) = Request::new(()).into_parts();

        let correlation = Correlation::from_request_parts(&mut parts, &()).await.unwrap();

        assert_eq!(correlation, Correlation::default());
    }

    #[tokio::test]
    async fn test_correlation_read_from_extensions() {
        let mut request = Request::new(());
        request.extensions_mut().insert(Correlation {
            version: "v2".to_string(),
            request_id: "abc".to_string(),
        });
        let (mut parts, _) = request.into_parts();

        let correlation = Correlation::from_request_parts(&mut parts, &()).await.unwrap();

        assert_eq!(correlation.version, "v2");
        assert_eq!(correlation.request_id, "abc");
    }
}
