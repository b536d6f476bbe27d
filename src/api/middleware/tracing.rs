//! HTTP request/response tracing middleware.

use axum::{body::Body, http::Request};
use tower_http::LatencyUnit;
use tower_http::classify::{ServerErrorsAsFailures, SharedClassifier};
use tower_http::trace::{DefaultOnResponse, TraceLayer};
use tracing::{Level, Span};

/// Span builder used by [`layer`].
pub type MakeHttpSpan = fn(&Request<Body>) -> Span;

/// Creates a tracing middleware for HTTP requests.
///
/// Opens an `http` span per request with method, path and HTTP version. The
/// `request` span of [`crate::correlation::request_id_layer`] nests inside it,
/// so handler logs carry both. Status and latency are logged at `INFO` when
/// the response is produced.
///
/// ```text
/// INFO http{method=POST path=/api/users version=HTTP/1.1}:request{request_id=…}: User registered user_id=1
/// INFO http{method=POST path=/api/users version=HTTP/1.1}: finished processing request latency=2 ms status=201
/// ```
pub fn layer() -> TraceLayer<SharedClassifier<ServerErrorsAsFailures>, MakeHttpSpan> {
    TraceLayer::new_for_http()
        .make_span_with(http_span as MakeHttpSpan)
        .on_response(
            DefaultOnResponse::new()
                .level(Level::INFO)
                .latency_unit(LatencyUnit::Millis),
        )
}

fn http_span(req: &Request<Body>) -> Span {
    tracing::info_span!(
        "http",
        method = %req.method(),
        path = %req.uri().path(),
        version = ?req.version(),
    )
}
