//! Billing route handlers: catalog bootstrap, price listing, subscription
//! creation and the Stripe webhook receiver.

use axum::{extract::State, http::HeaderMap, Json};
use serde::{Deserialize, Serialize};
use stripe::{Price, Product};

use nicenovel_shared::PriceRow;

use crate::error::{ApiError, ApiResult};
use crate::routes::ApiResponse;
use crate::state::AppState;

// ============================================================================
// Catalog
// ============================================================================

/// Raw Stripe payloads plus the mirrored rows, as the original API shaped them
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogResponse {
    pub product: Product,
    pub prices: CatalogPrices,
    pub saved_prices: Vec<PriceRow>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogPrices {
    pub three_days: Price,
    pub seven_days: Price,
}

/// Create the fixed subscription product with its two price tiers and mirror
/// both prices. POST /create-subscription-products
pub async fn create_catalog(
    State(state): State<AppState>,
) -> ApiResult<Json<ApiResponse<CatalogResponse>>> {
    let catalog = state
        .billing
        .catalog
        .bootstrap()
        .await
        .map_err(|e| ApiError::from_billing(e, state.config.environment))?;

    Ok(Json(ApiResponse::ok(CatalogResponse {
        product: catalog.product,
        prices: CatalogPrices {
            three_days: catalog.three_day,
            seven_days: catalog.seven_day,
        },
        saved_prices: catalog.saved,
    })))
}

/// List mirrored prices, cheapest first. GET /subscription-prices
pub async fn list_prices(
    State(state): State<AppState>,
) -> ApiResult<Json<ApiResponse<Vec<PriceRow>>>> {
    let prices = state
        .billing
        .catalog
        .list_prices()
        .await
        .map_err(|e| ApiError::from_billing(e, state.config.environment))?;

    Ok(Json(ApiResponse::ok(prices)))
}

// ============================================================================
// Subscription creation
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSubscriptionRequest {
    #[serde(default)]
    pub price_id: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

impl CreateSubscriptionRequest {
    /// Both fields are required and must be non-empty. Validation happens
    /// before any provider call.
    fn validated(&self) -> Result<(&str, &str), ApiError> {
        match (self.price_id.as_deref(), self.email.as_deref()) {
            (Some(price_id), Some(email)) if !price_id.is_empty() && !email.is_empty() => {
                Ok((price_id, email))
            }
            _ => Err(ApiError::Validation(
                "Missing required parameters: priceId or email".to_string(),
            )),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSubscriptionResponse {
    pub customer_id: String,
    pub subscription_id: String,
    pub client_secret: String,
}

/// Create a customer and an incomplete subscription for the chosen price.
/// POST /create-subscription
pub async fn create_subscription(
    State(state): State<AppState>,
    Json(request): Json<CreateSubscriptionRequest>,
) -> ApiResult<Json<ApiResponse<CreateSubscriptionResponse>>> {
    let (price_id, email) = request.validated()?;

    let customer = state
        .billing
        .customers
        .create_customer(email)
        .await
        .map_err(|e| ApiError::from_billing(e, state.config.environment))?;

    let created = state
        .billing
        .subscriptions
        .create_subscription(customer.id.as_str(), price_id)
        .await
        .map_err(|e| ApiError::from_billing(e, state.config.environment))?;

    Ok(Json(ApiResponse::ok(CreateSubscriptionResponse {
        customer_id: created.customer_id,
        subscription_id: created.subscription_id,
        client_secret: created.client_secret,
    })))
}

// ============================================================================
// Webhook
// ============================================================================

/// Handle Stripe webhook events. POST /webhook
///
/// The body is taken unparsed: the signature is computed over the raw bytes
/// as transmitted, so the payload must reach verification verbatim.
pub async fn webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: String,
) -> ApiResult<Json<ApiResponse<serde_json::Value>>> {
    let signature = headers
        .get("stripe-signature")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| {
            tracing::warn!("Stripe webhook missing signature header");
            ApiError::BadRequest("Missing Stripe signature".to_string())
        })?;

    let event = state
        .billing
        .webhooks
        .verify_event(&body, signature)
        .map_err(|e| ApiError::from_billing(e, state.config.environment))?;

    state
        .billing
        .webhooks
        .handle_event(event)
        .await
        .map_err(|e| ApiError::from_billing(e, state.config.environment))?;

    Ok(Json(ApiResponse::ok(serde_json::json!([]))))
}
