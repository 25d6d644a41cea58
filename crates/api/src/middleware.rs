use std::time::Instant;

use axum::{
    http::{HeaderName, HeaderValue},
    middleware::Next,
    response::Response,
};
use tracing::Instrument;

use crate::context::RequestContext;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Wrap each request in a span carrying a fresh request id, and log the
/// outcome once the handler returns.
pub async fn trace_requests(mut req: axum::http::Request<axum::body::Body>, next: Next) -> Response {
    let ctx = RequestContext::generate();
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    req.extensions_mut().insert(ctx);

    let span = tracing::info_span!(
        "request",
        request_id = %ctx.request_id(),
        %method,
        %path,
    );

    async move {
        let started = Instant::now();
        let mut response = next.run(req).await;
        let status = response.status();
        let latency_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), latency_ms, "request failed");
        } else {
            tracing::info!(status = status.as_u16(), latency_ms, "request completed");
        }

        if let Ok(value) = HeaderValue::from_str(&ctx.request_id().to_string()) {
            response
                .headers_mut()
                .insert(HeaderName::from_static(REQUEST_ID_HEADER), value);
        }
        response
    }
    .instrument(span)
    .await
}
