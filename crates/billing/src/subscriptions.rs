//! Stripe subscription creation and the subscription mirror

use serde::Serialize;
use sqlx::PgPool;
use stripe::{
    CreateSubscription, CreateSubscriptionItems, CreateSubscriptionPaymentSettings,
    CreateSubscriptionPaymentSettingsSaveDefaultPaymentMethod, CustomerId, Expandable,
    Subscription, SubscriptionPaymentBehavior,
};

use nicenovel_shared::SubscriptionRow;

use crate::client::StripeClient;
use crate::error::{BillingError, BillingResult};

/// A freshly created subscription, reduced to what the client needs to
/// complete payment confirmation.
#[derive(Debug, Clone, Serialize)]
pub struct NewSubscription {
    pub customer_id: String,
    pub subscription_id: String,
    /// Payment-intent client secret from the expanded latest invoice
    pub client_secret: String,
}

/// Subscription state extracted from a webhook payload, ready to mirror
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriptionUpdate {
    pub subscription_id: String,
    pub customer_id: String,
    pub status: String,
    pub price_id: Option<String>,
    pub current_period_end: Option<i64>,
}

impl SubscriptionUpdate {
    /// Flatten a Stripe subscription object into the mirrored fields
    pub fn from_subscription(subscription: &Subscription) -> Self {
        let customer_id = match &subscription.customer {
            Expandable::Id(id) => id.to_string(),
            Expandable::Object(customer) => customer.id.to_string(),
        };

        Self {
            subscription_id: subscription.id.to_string(),
            customer_id,
            status: subscription.status.to_string(),
            price_id: subscription
                .items
                .data
                .first()
                .and_then(|item| item.price.as_ref())
                .map(|price| price.id.to_string()),
            current_period_end: Some(subscription.current_period_end),
        }
    }
}

/// Subscription service: creates subscriptions on Stripe and reconciles the
/// local mirror against webhook events.
pub struct SubscriptionService {
    stripe: StripeClient,
    pool: PgPool,
}

impl SubscriptionService {
    pub fn new(stripe: StripeClient, pool: PgPool) -> Self {
        Self { stripe, pool }
    }

    /// Create an incomplete subscription for the customer and price.
    ///
    /// Uses `default_incomplete` payment behavior and saves the default
    /// payment method on the subscription, so the returned client secret can
    /// drive payment confirmation on the client side.
    pub async fn create_subscription(
        &self,
        customer_id: &str,
        price_id: &str,
    ) -> BillingResult<NewSubscription> {
        let customer_id = customer_id
            .parse::<CustomerId>()
            .map_err(|e| BillingError::StripeApi(format!("Invalid customer ID: {}", e)))?;

        let mut params = CreateSubscription::new(customer_id.clone());
        params.items = Some(vec![CreateSubscriptionItems {
            price: Some(price_id.to_string()),
            quantity: Some(1),
            ..Default::default()
        }]);
        params.payment_behavior = Some(SubscriptionPaymentBehavior::DefaultIncomplete);
        params.payment_settings = Some(CreateSubscriptionPaymentSettings {
            save_default_payment_method: Some(
                CreateSubscriptionPaymentSettingsSaveDefaultPaymentMethod::OnSubscription,
            ),
            ..Default::default()
        });
        params.expand = &["latest_invoice.payment_intent"];

        let subscription = Subscription::create(self.stripe.inner(), params).await?;
        let client_secret = extract_client_secret(&subscription)?;

        tracing::info!(
            customer_id = %customer_id,
            subscription_id = %subscription.id,
            price_id = price_id,
            "Created subscription"
        );

        Ok(NewSubscription {
            customer_id: customer_id.to_string(),
            subscription_id: subscription.id.to_string(),
            client_secret,
        })
    }

    /// Insert or refresh a mirrored subscription row
    pub async fn upsert_subscription(&self, update: &SubscriptionUpdate) -> BillingResult<()> {
        sqlx::query(
            r#"
            INSERT INTO stripe_subscriptions
                (stripe_subscription_id, stripe_customer_id, status, price_id, current_period_end)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (stripe_subscription_id) DO UPDATE SET
                stripe_customer_id = EXCLUDED.stripe_customer_id,
                status = EXCLUDED.status,
                price_id = EXCLUDED.price_id,
                current_period_end = EXCLUDED.current_period_end
            "#,
        )
        .bind(&update.subscription_id)
        .bind(&update.customer_id)
        .bind(&update.status)
        .bind(&update.price_id)
        .bind(update.current_period_end)
        .execute(&self.pool)
        .await?;

        tracing::info!(
            subscription_id = %update.subscription_id,
            status = %update.status,
            "Mirrored subscription"
        );

        Ok(())
    }

    /// Look up a mirrored subscription by Stripe subscription ID
    pub async fn find_subscription(
        &self,
        subscription_id: &str,
    ) -> BillingResult<Option<SubscriptionRow>> {
        let row: Option<SubscriptionRow> = sqlx::query_as(
            r#"
            SELECT stripe_subscription_id, stripe_customer_id, status, price_id,
                   current_period_end, created_at
            FROM stripe_subscriptions
            WHERE stripe_subscription_id = $1
            "#,
        )
        .bind(subscription_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    /// Remove a mirrored subscription row
    pub async fn delete_subscription(&self, subscription_id: &str) -> BillingResult<()> {
        sqlx::query("DELETE FROM stripe_subscriptions WHERE stripe_subscription_id = $1")
            .bind(subscription_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

/// Pull the payment-intent client secret out of the expanded latest invoice
fn extract_client_secret(subscription: &Subscription) -> BillingResult<String> {
    let invoice = match &subscription.latest_invoice {
        Some(Expandable::Object(invoice)) => invoice,
        _ => {
            return Err(BillingError::StripeApi(
                "subscription has no expanded latest invoice".to_string(),
            ))
        }
    };

    let payment_intent = match &invoice.payment_intent {
        Some(Expandable::Object(payment_intent)) => payment_intent,
        _ => {
            return Err(BillingError::StripeApi(
                "latest invoice has no expanded payment intent".to_string(),
            ))
        }
    };

    payment_intent.client_secret.clone().ok_or_else(|| {
        BillingError::StripeApi("payment intent carries no client secret".to_string())
    })
}
