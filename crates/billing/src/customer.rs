//! Stripe customer creation

use stripe::{CreateCustomer, Customer};

use crate::client::StripeClient;
use crate::error::BillingResult;

/// Customer service for creating Stripe customers
///
/// Every call creates a new customer. There is no lookup or dedup by email;
/// the caller owns any dedup policy.
pub struct CustomerService {
    stripe: StripeClient,
}

impl CustomerService {
    pub fn new(stripe: StripeClient) -> Self {
        Self { stripe }
    }

    /// Create a new Stripe customer for the given email address
    pub async fn create_customer(&self, email: &str) -> BillingResult<Customer> {
        let params = CreateCustomer {
            email: Some(email),
            ..Default::default()
        };

        let customer = Customer::create(self.stripe.inner(), params).await?;

        tracing::info!(customer_id = %customer.id, "Created Stripe customer");

        Ok(customer)
    }
}
