use axum::{routing::get, Router};

pub mod cache;
pub mod customers;
pub mod system;

/// Router for every endpoint the service exposes.
pub fn router() -> Router {
    Router::new()
        .route("/.well-known/alive", get(system::alive))
        .route("/.well-known/health", get(system::health))
        .route("/redis", get(cache::get_cached_value))
        .merge(customers::router())
}
