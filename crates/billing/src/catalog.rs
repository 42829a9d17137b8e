//! Subscription catalog bootstrap and the price mirror
//!
//! The catalog is fixed: one product with a 3-day and a 7-day recurring price.
//! Bootstrap creates the remote objects and mirrors each price into the
//! `stripe_prices` table.

use sqlx::PgPool;
use stripe::{
    CreatePrice, CreatePriceRecurring, CreatePriceRecurringInterval, CreateProduct, Currency,
    IdOrCreate, Price, Product,
};

use nicenovel_shared::PriceRow;

use crate::client::StripeClient;
use crate::error::{BillingError, BillingResult};

/// Name of the single subscription product
pub const PRODUCT_NAME: &str = "niceNovel_Svip";

const PRODUCT_DESCRIPTION: &str = "Unlimited reading access for subscribers";

/// One fixed price tier of the catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceTier {
    pub nickname: &'static str,
    /// Amount in the smallest currency unit (USD cents)
    pub unit_amount: i64,
    /// Recurrence length in days
    pub interval_count: u64,
}

/// The two tiers every bootstrap call creates, in ascending price order
pub const CATALOG_TIERS: [PriceTier; 2] = [
    PriceTier {
        nickname: "3-day subscription",
        unit_amount: 990,
        interval_count: 3,
    },
    PriceTier {
        nickname: "7-day subscription",
        unit_amount: 1499,
        interval_count: 7,
    },
];

/// Result of a catalog bootstrap call
#[derive(Debug)]
pub struct CatalogBootstrap {
    /// Raw Stripe product
    pub product: Product,
    /// Raw Stripe price for the 3-day tier
    pub three_day: Price,
    /// Raw Stripe price for the 7-day tier
    pub seven_day: Price,
    /// Rows persisted to the mirror
    pub saved: Vec<PriceRow>,
}

/// Catalog service: creates the remote catalog and maintains the price mirror
pub struct CatalogService {
    stripe: StripeClient,
    pool: PgPool,
}

impl CatalogService {
    pub fn new(stripe: StripeClient, pool: PgPool) -> Self {
        Self { stripe, pool }
    }

    /// Create the product and its two price tiers on Stripe, then mirror
    /// both prices locally.
    ///
    /// Not idempotent: every call creates new remote objects, and a repeated
    /// local insert fails on the price ID uniqueness constraint.
    pub async fn bootstrap(&self) -> BillingResult<CatalogBootstrap> {
        let mut params = CreateProduct::new(PRODUCT_NAME);
        params.description = Some(PRODUCT_DESCRIPTION);
        let product = Product::create(self.stripe.inner(), params).await?;

        tracing::info!(product_id = %product.id, "Created subscription product");

        let three_day = self.create_price(product.id.as_str(), &CATALOG_TIERS[0]).await?;
        let seven_day = self.create_price(product.id.as_str(), &CATALOG_TIERS[1]).await?;

        let rows = vec![
            price_row(product.id.as_str(), &three_day)?,
            price_row(product.id.as_str(), &seven_day)?,
        ];
        let saved = self.insert_prices(&rows).await?;

        tracing::info!(
            product_id = %product.id,
            prices = saved.len(),
            "Catalog bootstrap complete"
        );

        Ok(CatalogBootstrap {
            product,
            three_day,
            seven_day,
            saved,
        })
    }

    async fn create_price(&self, product_id: &str, tier: &PriceTier) -> BillingResult<Price> {
        let mut params = CreatePrice::new(Currency::USD);
        params.product = Some(IdOrCreate::Id(product_id));
        params.unit_amount = Some(tier.unit_amount);
        params.nickname = Some(tier.nickname);
        params.recurring = Some(CreatePriceRecurring {
            interval: CreatePriceRecurringInterval::Day,
            interval_count: Some(tier.interval_count),
            ..Default::default()
        });

        let price = Price::create(self.stripe.inner(), params).await?;

        tracing::info!(
            price_id = %price.id,
            nickname = tier.nickname,
            unit_amount = tier.unit_amount,
            "Created price"
        );

        Ok(price)
    }

    /// Insert mirrored price rows in one transaction.
    ///
    /// No upsert: a duplicate price ID surfaces the store's uniqueness error.
    pub async fn insert_prices(&self, rows: &[PriceRow]) -> BillingResult<Vec<PriceRow>> {
        let mut tx = self.pool.begin().await?;
        let mut saved = Vec::with_capacity(rows.len());

        for row in rows {
            let inserted: PriceRow = sqlx::query_as(
                r#"
                INSERT INTO stripe_prices
                    (price_id, product_id, nickname, unit_amount, currency, interval, interval_count)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                RETURNING price_id, product_id, nickname, unit_amount, currency, interval, interval_count
                "#,
            )
            .bind(&row.price_id)
            .bind(&row.product_id)
            .bind(&row.nickname)
            .bind(row.unit_amount)
            .bind(&row.currency)
            .bind(&row.interval)
            .bind(row.interval_count)
            .fetch_one(&mut *tx)
            .await?;

            saved.push(inserted);
        }

        tx.commit().await?;
        Ok(saved)
    }

    /// Full mirrored catalog, cheapest first
    pub async fn list_prices(&self) -> BillingResult<Vec<PriceRow>> {
        let prices: Vec<PriceRow> = sqlx::query_as(
            r#"
            SELECT price_id, product_id, nickname, unit_amount, currency, interval, interval_count
            FROM stripe_prices
            ORDER BY unit_amount ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(prices)
    }
}

/// Flatten a Stripe price into its mirror row
fn price_row(product_id: &str, price: &Price) -> BillingResult<PriceRow> {
    let recurring = price.recurring.as_ref().ok_or_else(|| {
        BillingError::StripeApi(format!("price {} has no recurring component", price.id))
    })?;

    Ok(PriceRow {
        price_id: price.id.to_string(),
        product_id: product_id.to_string(),
        nickname: price.nickname.clone().unwrap_or_default(),
        unit_amount: price.unit_amount.unwrap_or_default(),
        currency: price.currency.map(|c| c.to_string()).unwrap_or_default(),
        interval: recurring.interval.to_string(),
        interval_count: recurring.interval_count as i32,
    })
}
