//! Stripe billing integration for niceNovel
//!
//! Thin wrappers over the Stripe API (catalog, customers, subscriptions,
//! webhooks) plus the Postgres mirror of price and subscription state.

pub mod catalog;
pub mod client;
pub mod customer;
pub mod error;
pub mod subscriptions;
pub mod webhooks;

pub use catalog::{CatalogBootstrap, CatalogService, PriceTier, CATALOG_TIERS, PRODUCT_NAME};
pub use client::{StripeClient, StripeConfig};
pub use customer::CustomerService;
pub use error::{BillingError, BillingResult};
pub use subscriptions::{NewSubscription, SubscriptionService, SubscriptionUpdate};
pub use webhooks::{MirrorAction, WebhookEvent, WebhookHandler};
