//! Writing the JSON envelope to a response.

use axum::body::Body;
use axum::http::{HeaderMap, HeaderName, HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use std::io;

use super::{Correlation, Envelope};
use crate::error::ApiError;

/// Header carrying the reason phrase of the response status.
pub const STATUS_HEADER: HeaderName = HeaderName::from_static("status");

const MISSING_API_ERROR: &str = "write_json called without an ApiError";

/// Destination of a JSON response: headers, status line and body.
pub trait ResponseSink {
    fn headers_mut(&mut self) -> &mut HeaderMap;

    fn write_head(&mut self, status: StatusCode);

    /// Writes the body.
    ///
    /// # Errors
    ///
    /// Returns an error if the body cannot be delivered.
    fn write_body(&mut self, body: Vec<u8>) -> io::Result<()>;
}

/// In-memory [`ResponseSink`] that becomes an axum [`Response`].
#[derive(Debug, Default)]
pub struct BufferedResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Vec<u8>,
}

impl BufferedResponse {
    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }
}

impl ResponseSink for BufferedResponse {
    fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    fn write_head(&mut self, status: StatusCode) {
        self.status = status;
    }

    fn write_body(&mut self, body: Vec<u8>) -> io::Result<()> {
        self.body = body;
        Ok(())
    }
}

impl IntoResponse for BufferedResponse {
    fn into_response(self) -> Response {
        (self.status, self.headers, Body::from(self.body)).into_response()
    }
}

fn reason_phrase(status: StatusCode) -> HeaderValue {
    HeaderValue::from_static(status.canonical_reason().unwrap_or(""))
}

/// Serializes `data` into the envelope and writes it to `sink`.
///
/// A missing `api_error` is replaced by [`ApiError::internal`] with a cause
/// describing the misuse. Extra `headers` are applied in order; a later map
/// replaces every value of a header set by an earlier one.
///
/// Returns `None` once the response has been fully written. Otherwise returns
/// the error that was being sent, with the failure appended to its causes:
///
/// - missing `api_error`: the 500 error that was written
/// - serialization failure: the sink still gets a 500 status line
/// - body write failure: headers and status were already written
pub fn write_json<W, T>(
    sink: &mut W,
    correlation: &Correlation,
    api_error: Option<&ApiError>,
    data: &T,
    headers: &[HeaderMap],
) -> Option<ApiError>
where
    W: ResponseSink + ?Sized,
    T: Serialize + ?Sized,
{
    let missing = api_error.is_none();
    let api_error = match api_error {
        Some(api_error) => api_error.clone(),
        None => ApiError::internal(MISSING_API_ERROR),
    };

    let envelope =
        Envelope::from_correlation(correlation, data, api_error.biz_code(), api_error.message());

    let body = match serde_json::to_vec(&envelope) {
        Ok(body) => body,
        Err(err) => {
            let status = StatusCode::INTERNAL_SERVER_ERROR;
            sink.headers_mut()
                .insert(STATUS_HEADER, reason_phrase(status));
            sink.write_head(status);
            return Some(api_error.with_cause(err, &["failed to serialize response data"]));
        }
    };

    for extra in headers {
        let target = sink.headers_mut();
        for name in extra.keys() {
            target.remove(name);
            for value in extra.get_all(name) {
                target.append(name.clone(), value.clone());
            }
        }
    }

    let status = api_error.status();
    let target = sink.headers_mut();
    target.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
    target.insert(STATUS_HEADER, reason_phrase(status));
    sink.write_head(status);

    match sink.write_body(body) {
        Ok(()) => missing.then_some(api_error),
        Err(err) => Some(api_error.with_cause(err, &["failed to write response"])),
    }
}

/// Handler return type that writes the envelope through [`write_json`].
///
/// A residual error from the write is logged with the request id.
///
/// ```rust,ignore
/// async fn get_user(correlation: Correlation, State(state): State<AppState>) -> Reply<User> {
///     Reply::new(correlation, state.catalog.ok.clone(), user)
/// }
/// ```
#[derive(Debug)]
pub struct Reply<T> {
    correlation: Correlation,
    error: Option<ApiError>,
    data: T,
    headers: Vec<HeaderMap>,
}

impl<T> Reply<T> {
    pub fn new(correlation: Correlation, error: impl Into<Option<ApiError>>, data: T) -> Self {
        Self {
            correlation,
            error: error.into(),
            data,
            headers: Vec::new(),
        }
    }

    /// Adds extra headers. Later maps override earlier ones.
    pub fn headers(mut self, headers: HeaderMap) -> Self {
        self.headers.push(headers);
        self
    }
}

impl<T: Serialize> IntoResponse for Reply<T> {
    fn into_response(self) -> Response {
        let mut out = BufferedResponse::default();

        if let Some(residual) = write_json(
            &mut out,
            &self.correlation,
            self.error.as_ref(),
            &self.data,
            &self.headers,
        ) {
            tracing::error!(
                error = %residual,
                request_id = %self.correlation.request_id,
                "Failed to write JSON response"
            );
        }

        out.into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BizCodeRegistry;
    use crate::response::Envelope;
    use serde::Serializer;
    use serde::ser::Error as _;
    use serde_json::{Value, json};

    struct Unserializable;

    impl Serialize for Unserializable {
        fn serialize<S: Serializer>(&self, _serializer: S) -> Result<S::Ok, S::Error> {
            Err(S::Error::custom("cannot serialize"))
        }
    }

    struct BrokenPipe {
        inner: BufferedResponse,
    }

    impl ResponseSink for BrokenPipe {
        fn headers_mut(&mut self) -> &mut HeaderMap {
            self.inner.headers_mut()
        }

        fn write_head(&mut self, status: StatusCode) {
            self.inner.write_head(status);
        }

        fn write_body(&mut self, _body: Vec<u8>) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "client went away"))
        }
    }

    fn correlation() -> Correlation {
        Correlation {
            version: "1.0.0".to_string(),
            request_id: "req-42".to_string(),
        }
    }

    #[test]
    fn test_write_success_round_trips() {
        let registry = BizCodeRegistry::new();
        let ok = registry.register(StatusCode::OK, "OK", "success");
        let mut out = BufferedResponse::default();

        let residual = write_json(&mut out, &correlation(), Some(&ok), &json!({"id": 7}), &[]);

        assert!(residual.is_none());
        assert_eq!(out.status(), StatusCode::OK);
        assert_eq!(out.headers()[header::CONTENT_TYPE], "application/json");
        assert_eq!(out.headers()[&STATUS_HEADER], "OK");

        let envelope: Envelope<Value> = serde_json::from_slice(out.body()).unwrap();
        assert_eq!(envelope.biz_code, "OK");
        assert_eq!(envelope.message, "success");
        assert_eq!(envelope.data, json!({"id": 7}));
        assert_eq!(envelope.request_id, "req-42");
        assert_eq!(envelope.version, "1.0.0");
    }

    #[test]
    fn test_write_without_api_error() {
        let mut out = BufferedResponse::default();

        let residual = write_json(&mut out, &Correlation::default(), None, &"payload", &[]).unwrap();

        assert_eq!(residual.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(residual.message(), "Internal Server Error");
        assert_eq!(
            residual.cause().unwrap().root().unwrap().to_string(),
            MISSING_API_ERROR
        );
        assert_eq!(out.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let envelope: Envelope<Value> = serde_json::from_slice(out.body()).unwrap();
        assert_eq!(envelope.biz_code, "500");
        assert_eq!(envelope.data, json!("payload"));
    }

    #[test]
    fn test_write_serialization_failure() {
        let registry = BizCodeRegistry::new();
        let ok = registry.register(StatusCode::OK, "OK", "success");
        let mut out = BufferedResponse::default();

        let residual = write_json(&mut out, &correlation(), Some(&ok), &Unserializable, &[]).unwrap();

        assert_eq!(out.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(out.headers()[&STATUS_HEADER], "Internal Server Error");
        assert!(out.body().is_empty());
        assert_eq!(residual.biz_code(), "OK");
        assert_eq!(residual.message(), "failed to serialize response data");
        assert!(residual.find_cause::<serde_json::Error>().is_some());
    }

    #[test]
    fn test_write_body_failure() {
        let registry = BizCodeRegistry::new();
        let not_found = registry.register(StatusCode::NOT_FOUND, "USER_NOT_FOUND", "user not found");
        let mut sink = BrokenPipe {
            inner: BufferedResponse::default(),
        };

        let residual = write_json(&mut sink, &correlation(), Some(&not_found), &(), &[]).unwrap();

        assert_eq!(sink.inner.status(), StatusCode::NOT_FOUND);
        assert_eq!(residual.biz_code(), "USER_NOT_FOUND");
        assert_eq!(residual.status(), StatusCode::NOT_FOUND);
        let io_err = residual.find_cause::<io::Error>().unwrap();
        assert_eq!(io_err.kind(), io::ErrorKind::BrokenPipe);
    }

    #[test]
    fn test_extra_headers_later_overrides_earlier() {
        let registry = BizCodeRegistry::new();
        let ok = registry.register(StatusCode::CREATED, "CREATED", "created");
        let mut out = BufferedResponse::default();

        let mut first = HeaderMap::new();
        first.insert("x-trace", HeaderValue::from_static("one"));
        first.insert("cache-control", HeaderValue::from_static("no-store"));
        let mut second = HeaderMap::new();
        second.append("x-trace", HeaderValue::from_static("two"));
        second.append("x-trace", HeaderValue::from_static("three"));

        let residual = write_json(&mut out, &correlation(), Some(&ok), &(), &[first, second]);

        assert!(residual.is_none());
        let traces: Vec<_> = out.headers().get_all("x-trace").iter().collect();
        assert_eq!(traces, vec!["two", "three"]);
        assert_eq!(out.headers()["cache-control"], "no-store");
        assert_eq!(out.headers()[&STATUS_HEADER], "Created");
    }

    #[test]
    fn test_content_type_cannot_be_overridden_by_extra_headers() {
        let registry = BizCodeRegistry::new();
        let ok = registry.register(StatusCode::OK, "OK", "success");
        let mut out = BufferedResponse::default();
        let mut extra = HeaderMap::new();
        extra.insert(header::CONTENT_TYPE, HeaderValue::from_static("text/plain"));

        write_json(&mut out, &correlation(), Some(&ok), &(), &[extra]);

        assert_eq!(out.headers()[header::CONTENT_TYPE], "application/json");
    }
}
