pub mod admin;
pub mod auth;
pub mod orders;
pub mod webhooks;

use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use site_core::error::AppError;

use crate::services::metrics;

pub async fn health_check() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(json!({ "status": "ok", "service": "storefront-service" })),
    )
}

pub async fn metrics_endpoint() -> impl IntoResponse {
    metrics::get_metrics()
}

/// Build a field-level validation error so clients can render the message
/// against the right form field.
pub(crate) fn field_validation_error(field: &'static str, message: &'static str) -> AppError {
    let mut err = validator::ValidationError::new("invalid");
    err.message = Some(message.into());
    let mut errors = validator::ValidationErrors::new();
    errors.add(field, err);
    AppError::ValidationError(errors)
}
