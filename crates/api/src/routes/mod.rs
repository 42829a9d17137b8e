//! API routes

pub mod billing;
pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use serde::Serialize;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::state::AppState;

/// Uniform success envelope: `{code, message, data}`
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub code: u16,
    pub message: String,
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            code: 200,
            message: "success".to_string(),
            data,
        }
    }
}

/// Create all API routes
pub fn create_router(state: AppState) -> Router {
    // The original deployment served browser clients from any origin
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health::health))
        .route(
            "/create-subscription-products",
            post(billing::create_catalog),
        )
        .route("/subscription-prices", get(billing::list_prices))
        .route("/create-subscription", post(billing::create_subscription))
        .route("/webhook", post(billing::webhook))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(10 * 1024 * 1024)) // 10MB, matches the original body limit
        .with_state(state)
}
