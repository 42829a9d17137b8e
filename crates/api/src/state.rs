//! Shared application state

use std::sync::Arc;

use sqlx::PgPool;

use nicenovel_billing::{
    CatalogService, CustomerService, StripeClient, StripeConfig, SubscriptionService,
    WebhookHandler,
};

use crate::config::Config;

/// Billing services, constructed once at startup
pub struct BillingServices {
    pub catalog: CatalogService,
    pub customers: CustomerService,
    pub subscriptions: SubscriptionService,
    pub webhooks: WebhookHandler,
}

/// Application state shared across request handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub pool: PgPool,
    pub billing: Arc<BillingServices>,
}

impl AppState {
    pub fn new(config: Config, pool: PgPool) -> Self {
        let stripe = StripeClient::new(StripeConfig {
            secret_key: config.stripe_secret_key.clone(),
            webhook_secret: config.stripe_webhook_secret.clone(),
        });

        let billing = BillingServices {
            catalog: CatalogService::new(stripe.clone(), pool.clone()),
            customers: CustomerService::new(stripe.clone()),
            subscriptions: SubscriptionService::new(stripe.clone(), pool.clone()),
            webhooks: WebhookHandler::new(stripe, pool.clone()),
        };

        Self {
            config: Arc::new(config),
            pool,
            billing: Arc::new(billing),
        }
    }
}
