//! Mirror-store integration tests
//!
//! These exercise the price mirror and the webhook deletion path against a
//! real database. Run with a migrated database and `DATABASE_URL` set:
//!
//! ```bash
//! cargo test -p nicenovel-billing -- --ignored
//! ```

#![allow(clippy::unwrap_used, clippy::expect_used)]

use nicenovel_billing::{
    CatalogService, MirrorAction, StripeClient, StripeConfig, SubscriptionService,
    SubscriptionUpdate, WebhookHandler,
};
use nicenovel_shared::{db::create_pool, PriceRow};
use sqlx::PgPool;

async fn test_pool() -> PgPool {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");
    create_pool(&url).await.expect("Failed to create pool")
}

// Dummy credentials: these tests never call out to Stripe
fn test_stripe() -> StripeClient {
    StripeClient::new(StripeConfig {
        secret_key: "sk_test_unused".to_string(),
        webhook_secret: "whsec_unused".to_string(),
    })
}

fn unique_id(prefix: &str) -> String {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("clock before epoch")
        .as_nanos();
    format!("{}_{}", prefix, nanos)
}

fn price_row(price_id: &str, product_id: &str, nickname: &str, unit_amount: i64, days: i32) -> PriceRow {
    PriceRow {
        price_id: price_id.to_string(),
        product_id: product_id.to_string(),
        nickname: nickname.to_string(),
        unit_amount,
        currency: "usd".to_string(),
        interval: "day".to_string(),
        interval_count: days,
    }
}

#[tokio::test]
#[ignore] // Requires database
async fn test_list_prices_sorted_ascending_for_any_insertion_order() {
    let pool = test_pool().await;
    let catalog = CatalogService::new(test_stripe(), pool);

    let product_id = unique_id("prod");
    // Insert the expensive tier first to prove ordering is done by the store
    let expensive = price_row(&unique_id("price_hi"), &product_id, "7-day subscription", 1499, 7);
    let cheap = price_row(&unique_id("price_lo"), &product_id, "3-day subscription", 990, 3);

    catalog
        .insert_prices(&[expensive.clone(), cheap.clone()])
        .await
        .expect("insert should succeed");

    let listed = catalog.list_prices().await.expect("list should succeed");
    assert!(
        listed.windows(2).all(|w| w[0].unit_amount <= w[1].unit_amount),
        "prices must be sorted ascending by unit_amount"
    );

    let pos_cheap = listed.iter().position(|p| p.price_id == cheap.price_id);
    let pos_expensive = listed.iter().position(|p| p.price_id == expensive.price_id);
    assert!(pos_cheap.unwrap() < pos_expensive.unwrap());
}

#[tokio::test]
#[ignore] // Requires database
async fn test_inserted_price_round_trips_every_field() {
    let pool = test_pool().await;
    let catalog = CatalogService::new(test_stripe(), pool);

    let row = price_row(
        &unique_id("price_rt"),
        &unique_id("prod_rt"),
        "3-day subscription",
        990,
        3,
    );

    let saved = catalog
        .insert_prices(std::slice::from_ref(&row))
        .await
        .expect("insert should succeed");
    assert_eq!(saved, vec![row.clone()], "RETURNING must echo the row exactly");

    let listed = catalog.list_prices().await.expect("list should succeed");
    let fetched = listed
        .into_iter()
        .find(|p| p.price_id == row.price_id)
        .expect("inserted row should be listed");
    assert_eq!(fetched, row, "every field must survive the round trip");
}

#[tokio::test]
#[ignore] // Requires database
async fn test_duplicate_price_id_insert_fails() {
    let pool = test_pool().await;
    let catalog = CatalogService::new(test_stripe(), pool);

    let row = price_row(&unique_id("price_dup"), &unique_id("prod_dup"), "dup", 990, 3);

    catalog
        .insert_prices(std::slice::from_ref(&row))
        .await
        .expect("first insert should succeed");
    let second = catalog.insert_prices(std::slice::from_ref(&row)).await;
    assert!(second.is_err(), "duplicate price_id must hit the unique key");
}

#[tokio::test]
#[ignore] // Requires database
async fn test_deleted_event_delivered_twice_is_idempotent() {
    let pool = test_pool().await;
    let subscriptions = SubscriptionService::new(test_stripe(), pool.clone());
    let webhooks = WebhookHandler::new(test_stripe(), pool);

    let subscription_id = unique_id("sub");
    let update = SubscriptionUpdate {
        subscription_id: subscription_id.clone(),
        customer_id: unique_id("cus"),
        status: "active".to_string(),
        price_id: Some(unique_id("price")),
        current_period_end: Some(1_700_000_000),
    };

    webhooks
        .apply(MirrorAction::Upsert(update))
        .await
        .expect("upsert should succeed");
    assert!(subscriptions
        .find_subscription(&subscription_id)
        .await
        .expect("lookup should succeed")
        .is_some());

    // First delivery removes the row
    webhooks
        .apply(MirrorAction::Delete {
            subscription_id: subscription_id.clone(),
        })
        .await
        .expect("first delete should succeed");
    assert!(subscriptions
        .find_subscription(&subscription_id)
        .await
        .expect("lookup should succeed")
        .is_none());

    // Redelivery finds nothing and must still succeed
    webhooks
        .apply(MirrorAction::Delete {
            subscription_id: subscription_id.clone(),
        })
        .await
        .expect("redelivered delete must be a successful no-op");
}

#[tokio::test]
#[ignore] // Requires database
async fn test_upsert_refreshes_existing_row() {
    let pool = test_pool().await;
    let subscriptions = SubscriptionService::new(test_stripe(), pool.clone());
    let webhooks = WebhookHandler::new(test_stripe(), pool);

    let subscription_id = unique_id("sub_up");
    let mut update = SubscriptionUpdate {
        subscription_id: subscription_id.clone(),
        customer_id: unique_id("cus"),
        status: "incomplete".to_string(),
        price_id: None,
        current_period_end: None,
    };

    webhooks
        .apply(MirrorAction::Upsert(update.clone()))
        .await
        .expect("insert should succeed");

    update.status = "active".to_string();
    update.current_period_end = Some(1_800_000_000);
    webhooks
        .apply(MirrorAction::Upsert(update.clone()))
        .await
        .expect("second upsert should not conflict");

    let row = subscriptions
        .find_subscription(&subscription_id)
        .await
        .expect("lookup should succeed")
        .expect("row should exist");
    assert_eq!(row.status, "active");
    assert_eq!(row.current_period_end, Some(1_800_000_000));

    subscriptions
        .delete_subscription(&subscription_id)
        .await
        .expect("cleanup should succeed");
}
