//! Row types for the Stripe mirror tables

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;

/// One mirrored price option from the `stripe_prices` table.
///
/// Written once by catalog bootstrap, immediately after Stripe confirms the
/// remote price object. Never updated or deleted afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct PriceRow {
    /// Stripe price ID, unique within the mirror
    pub price_id: String,
    /// Stripe product ID grouping the price options
    pub product_id: String,
    /// Human label, e.g. "3-day subscription"
    pub nickname: String,
    /// Amount in the smallest currency unit
    pub unit_amount: i64,
    pub currency: String,
    /// Recurrence unit: day/week/month/year
    pub interval: String,
    pub interval_count: i32,
}

/// Last-known state of a Stripe subscription, keyed by subscription ID.
///
/// Rows appear when a `customer.subscription.created` event arrives and
/// disappear on `customer.subscription.deleted`. A missing row means the
/// subscription is not tracked locally, which is not an error.
#[derive(Debug, Clone, FromRow)]
pub struct SubscriptionRow {
    pub stripe_subscription_id: String,
    pub stripe_customer_id: String,
    pub status: String,
    pub price_id: Option<String>,
    /// Unix timestamp of the current billing period end
    pub current_period_end: Option<i64>,
    pub created_at: OffsetDateTime,
}
