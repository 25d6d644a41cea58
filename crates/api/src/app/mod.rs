//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: store/cache wiring behind the resource mapper
//! - `routes/`: HTTP routes + handlers (one file per area)
//! - `dto.rs`: request bodies and the JSON-or-form body extractor
//! - `errors.rs`: consistent error responses

use std::sync::Arc;
use std::time::Duration;

use axum::{
    error_handling::HandleErrorLayer,
    http::StatusCode,
    response::Response,
    BoxError, Extension, Router,
};
use tower::ServiceBuilder;

use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

use services::AppServices;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
///
/// Services are injected; nothing is registered globally.
pub fn build_app(services: Arc<AppServices>, request_timeout: Duration) -> Router {
    routes::router()
        .layer(Extension(services))
        .layer(
            ServiceBuilder::new()
                .layer(axum::middleware::from_fn(middleware::trace_requests))
                .layer(HandleErrorLayer::new(handle_layer_error))
                .timeout(request_timeout),
        )
}

/// Render errors raised by tower layers (request deadline) as JSON.
///
/// When the deadline fires the handler future is dropped, which abandons any
/// in-flight store or cache call.
async fn handle_layer_error(err: BoxError) -> Response {
    if err.is::<tower::timeout::error::Elapsed>() {
        tracing::warn!("request deadline exceeded");
        errors::json_error(StatusCode::REQUEST_TIMEOUT, "timeout", "request timed out")
    } else {
        tracing::error!(error = %err, "unhandled layer error");
        errors::json_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "internal_error",
            err.to_string(),
        )
    }
}
