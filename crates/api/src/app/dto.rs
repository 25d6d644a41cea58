use axum::{
    async_trait,
    extract::{FromRequest, Request},
    http::{header::CONTENT_TYPE, HeaderValue},
    Form, Json,
};
use serde::Deserialize;

use crudline_customers::CustomerInput;

use crate::app::errors;

// -------------------------
// Request DTOs
// -------------------------

/// Body of `POST /customer` and `PUT /customer/{id}`.
#[derive(Debug, Deserialize)]
pub struct CustomerRequest {
    #[serde(default)]
    pub name: String,
}

impl From<CustomerRequest> for CustomerInput {
    fn from(body: CustomerRequest) -> Self {
        CustomerInput::new(body.name)
    }
}

/// Customer body decoded from JSON or, when the request says so, from an
/// `application/x-www-form-urlencoded` form.
///
/// Any decode failure is rejected as `invalid_input` (400).
#[derive(Debug)]
pub struct CustomerBody(pub CustomerRequest);

#[async_trait]
impl<S> FromRequest<S> for CustomerBody
where
    S: Send + Sync,
{
    type Rejection = axum::response::Response;

    async fn from_request(mut req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_form = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(is_form_content_type);

        if is_form {
            // `Form` itself matches the media type case-sensitively.
            req.headers_mut().insert(
                CONTENT_TYPE,
                HeaderValue::from_static("application/x-www-form-urlencoded"),
            );
            let Form(body) = Form::<CustomerRequest>::from_request(req, state)
                .await
                .map_err(|e| {
                    tracing::warn!(error = %e, "error binding customer form");
                    errors::invalid_input(e.body_text())
                })?;
            Ok(Self(body))
        } else {
            let Json(body) = Json::<CustomerRequest>::from_request(req, state)
                .await
                .map_err(|e| {
                    tracing::warn!(error = %e, "error binding customer data");
                    errors::invalid_input(e.body_text())
                })?;
            Ok(Self(body))
        }
    }
}

/// Media type (ignoring parameters) is `application/x-www-form-urlencoded`,
/// compared case-insensitively.
fn is_form_content_type(content_type: &str) -> bool {
    content_type
        .split(';')
        .next()
        .is_some_and(|mime| mime.trim().eq_ignore_ascii_case("application/x-www-form-urlencoded"))
}

/// Confirmation message for a write, e.g. "Customer added successfully".
pub fn confirmation(resource: &str, verb: &str) -> String {
    format!("{resource} {verb} successfully")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn form_media_type_matches_regardless_of_case_and_parameters() {
        assert!(is_form_content_type("application/x-www-form-urlencoded"));
        assert!(is_form_content_type("Application/X-WWW-Form-Urlencoded"));
        assert!(is_form_content_type("application/x-www-form-urlencoded; charset=UTF-8"));
    }

    #[test]
    fn other_media_types_are_not_forms() {
        assert!(!is_form_content_type("application/json"));
        assert!(!is_form_content_type("application/x-www-form-urlencodedx"));
        assert!(!is_form_content_type(""));
    }

    #[test]
    fn confirmation_names_resource_and_verb() {
        assert_eq!(confirmation("Customer", "added"), "Customer added successfully");
    }
}
