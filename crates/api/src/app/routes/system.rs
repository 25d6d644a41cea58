use std::sync::Arc;

use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};

use crate::app::services::{AppServices, HealthStatus};

pub async fn alive() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "UP" }))
}

pub async fn health(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    let report = services.health().await;
    let status = match report.status {
        HealthStatus::Up => StatusCode::OK,
        HealthStatus::Down => StatusCode::SERVICE_UNAVAILABLE,
    };
    (status, Json(report)).into_response()
}
