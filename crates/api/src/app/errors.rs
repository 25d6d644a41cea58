use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use crudline_infra::ServiceError;

pub fn service_error_to_response(err: ServiceError) -> axum::response::Response {
    match err {
        ServiceError::InvalidInput(msg) => json_error(StatusCode::BAD_REQUEST, "invalid_input", msg),
        e @ ServiceError::NotFound { .. } => json_error(StatusCode::NOT_FOUND, "not_found", e.to_string()),
        e @ ServiceError::StoreReadFailed(_) => {
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "store_read_failed", e.to_string())
        }
        e @ ServiceError::StoreWriteFailed(_) => {
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "store_write_failed", e.to_string())
        }
        e @ ServiceError::CacheReadFailed(_) => {
            json_error(StatusCode::BAD_GATEWAY, "cache_read_failed", e.to_string())
        }
    }
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

pub fn invalid_input(message: impl Into<String>) -> axum::response::Response {
    json_error(StatusCode::BAD_REQUEST, "invalid_input", message)
}
