//! API error types and handling
//!
//! Every failure is translated at the handler boundary into the uniform
//! `{code, message, data}` envelope; the HTTP status always reflects the
//! outcome and `data` is an empty array on errors.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use nicenovel_billing::BillingError;

use crate::config::Environment;

/// Application error type
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    // Validation errors
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Invalid request: {0}")]
    BadRequest(String),

    // Upstream provider errors
    #[error("Payment provider error: {0}")]
    Upstream(String),

    // Internal errors
    #[error("Database error: {0}")]
    Database(String),
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl ApiError {
    /// Translate a billing failure, redacting upstream error text in
    /// production deployments.
    pub fn from_billing(err: BillingError, environment: Environment) -> Self {
        match err {
            BillingError::Database(msg) => ApiError::Database(msg),
            BillingError::WebhookSignatureInvalid => {
                ApiError::BadRequest("Invalid webhook signature".to_string())
            }
            BillingError::StripeApi(_) if environment.is_production() => {
                tracing::error!(error = %err, "Stripe API error");
                ApiError::Upstream("Payment provider error".to_string())
            }
            BillingError::StripeApi(msg) => ApiError::Upstream(msg),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ApiError::Upstream(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
            ApiError::Database(msg) => {
                // Detail goes to the log only; clients get the fixed label
                tracing::error!(error = %msg, "Database error");
                (StatusCode::INTERNAL_SERVER_ERROR, "Database error".to_string())
            }
            ApiError::Internal(msg) => {
                tracing::error!(error = %msg, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(json!({
            "code": status.as_u16(),
            "message": message,
            "data": [],
        }));

        (status, body).into_response()
    }
}

/// Result type alias for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
