use std::sync::Arc;

use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};

use crate::app::errors;
use crate::app::services::AppServices;

/// `GET /redis`: the value under the configured key, or `""` when absent.
pub async fn get_cached_value(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    match services.cache.fetch().await {
        Ok(value) => (StatusCode::OK, Json(value)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}
