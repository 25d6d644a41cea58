use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};

use crudline_core::Resource;
use crudline_customers::{CreateCustomer, Customer, CustomerId};

use crate::app::dto::{self, CustomerBody};
use crate::app::errors;
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new()
        .route("/customer", get(list_customers).post(create_customer_from_body))
        // Older clients use the plural path.
        .route("/customers", get(list_customers))
        .route(
            "/customer/:id",
            get(get_customer)
                .post(create_customer_from_path)
                .put(update_customer)
                .delete(delete_customer),
        )
}

/// `POST /customer/{name}`
pub async fn create_customer_from_path(
    Extension(services): Extension<Arc<AppServices>>,
    Path(name): Path<String>,
) -> axum::response::Response {
    create_customer(services, CreateCustomer::FromPath { name }).await
}

/// `POST /customer` with a JSON or form body.
pub async fn create_customer_from_body(
    Extension(services): Extension<Arc<AppServices>>,
    CustomerBody(body): CustomerBody,
) -> axum::response::Response {
    create_customer(services, CreateCustomer::FromBody { name: body.name }).await
}

pub async fn list_customers(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    match services.customers.list_all().await {
        Ok(items) => (StatusCode::OK, Json(items)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn get_customer(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.customers.read_one(id).await {
        Ok(customer) => (StatusCode::OK, Json(customer)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

/// `PUT /customer/{id}`: renames in place. An unknown id is not an error.
pub async fn update_customer(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    CustomerBody(body): CustomerBody,
) -> axum::response::Response {
    let id = match parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.customers.update(id, body.into()).await {
        Ok(_) => message(dto::confirmation(Customer::NAME, "updated")),
        Err(e) => errors::service_error_to_response(e),
    }
}

/// `DELETE /customer/{id}`: idempotent, an unknown id is not an error.
pub async fn delete_customer(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.customers.delete(id).await {
        Ok(_) => message(dto::confirmation(Customer::NAME, "deleted")),
        Err(e) => errors::service_error_to_response(e),
    }
}

async fn create_customer(services: Arc<AppServices>, cmd: CreateCustomer) -> axum::response::Response {
    tracing::debug!(source = cmd.source(), "creating customer");

    match services.customers.create(cmd.into_input()).await {
        Ok(id) => (
            StatusCode::OK,
            [(header::LOCATION, format!("/customer/{id}"))],
            Json(dto::confirmation(Customer::NAME, "added")),
        )
            .into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

fn parse_id(raw: &str) -> Result<CustomerId, axum::response::Response> {
    raw.parse::<CustomerId>()
        .map_err(|e| errors::invalid_input(e.to_string()))
}

fn message(text: String) -> axum::response::Response {
    (StatusCode::OK, Json(text)).into_response()
}
