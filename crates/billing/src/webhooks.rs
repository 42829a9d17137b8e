//! Stripe webhook handling
//!
//! Verifies signed event payloads and reconciles the subscription mirror.
//! Dispatch is split in two: a decode step reducing the Stripe event to a
//! [`WebhookEvent`], and a pure mapping from that to a [`MirrorAction`], so
//! the routing logic is testable without a live provider.

use sqlx::PgPool;
use stripe::{Event, EventObject, EventType, Webhook};

use crate::client::StripeClient;
use crate::error::{BillingError, BillingResult};
use crate::subscriptions::{SubscriptionService, SubscriptionUpdate};

/// A verified webhook event, reduced to the fields the mirror cares about
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookEvent {
    /// Payment confirmed upstream; hook point only, nothing mirrored
    PaymentSucceeded { payment_intent_id: String },
    SubscriptionCreated(SubscriptionUpdate),
    /// Upstream state changed; acknowledged without touching the mirror
    SubscriptionUpdated {
        subscription_id: String,
        status: String,
    },
    SubscriptionDeleted { subscription_id: String },
    /// Known-but-unrouted event type
    Unhandled { event_type: String },
}

/// What a decoded event asks us to do to the mirror
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MirrorAction {
    Upsert(SubscriptionUpdate),
    /// Remove the row if present; absence is a successful no-op
    Delete { subscription_id: String },
    Noop,
}

impl WebhookEvent {
    /// Decode a verified Stripe event
    pub fn from_stripe(event: &Event) -> Self {
        match (&event.type_, &event.data.object) {
            (EventType::PaymentIntentSucceeded, EventObject::PaymentIntent(payment_intent)) => {
                Self::PaymentSucceeded {
                    payment_intent_id: payment_intent.id.to_string(),
                }
            }
            (EventType::CustomerSubscriptionCreated, EventObject::Subscription(subscription)) => {
                Self::SubscriptionCreated(SubscriptionUpdate::from_subscription(subscription))
            }
            (EventType::CustomerSubscriptionUpdated, EventObject::Subscription(subscription)) => {
                Self::SubscriptionUpdated {
                    subscription_id: subscription.id.to_string(),
                    status: subscription.status.to_string(),
                }
            }
            (EventType::CustomerSubscriptionDeleted, EventObject::Subscription(subscription)) => {
                Self::SubscriptionDeleted {
                    subscription_id: subscription.id.to_string(),
                }
            }
            _ => Self::Unhandled {
                event_type: event.type_.to_string(),
            },
        }
    }

    /// Map the decoded event to a mirror action. Pure dispatch.
    pub fn action(self) -> MirrorAction {
        match self {
            Self::SubscriptionCreated(update) => MirrorAction::Upsert(update),
            Self::SubscriptionDeleted { subscription_id } => {
                MirrorAction::Delete { subscription_id }
            }
            Self::PaymentSucceeded { .. }
            | Self::SubscriptionUpdated { .. }
            | Self::Unhandled { .. } => MirrorAction::Noop,
        }
    }
}

/// Webhook handler for Stripe events
pub struct WebhookHandler {
    stripe: StripeClient,
    subscriptions: SubscriptionService,
}

impl WebhookHandler {
    pub fn new(stripe: StripeClient, pool: PgPool) -> Self {
        let subscriptions = SubscriptionService::new(stripe.clone(), pool);
        Self {
            stripe,
            subscriptions,
        }
    }

    /// Verify and parse a Stripe webhook payload.
    ///
    /// `payload` must be the raw request body exactly as transmitted; the
    /// signature is computed over those bytes, and re-encoded JSON never
    /// verifies.
    pub fn verify_event(&self, payload: &str, signature: &str) -> BillingResult<Event> {
        Webhook::construct_event(payload, signature, &self.stripe.config().webhook_secret).map_err(
            |e| {
                tracing::warn!(error = %e, "Webhook signature verification failed");
                BillingError::WebhookSignatureInvalid
            },
        )
    }

    /// Handle a verified Stripe event
    pub async fn handle_event(&self, event: Event) -> BillingResult<()> {
        let decoded = WebhookEvent::from_stripe(&event);

        tracing::info!(
            event_id = %event.id,
            event_type = %event.type_,
            "Processing Stripe webhook event"
        );

        match &decoded {
            WebhookEvent::PaymentSucceeded { payment_intent_id } => {
                tracing::info!(%payment_intent_id, "Payment succeeded");
            }
            WebhookEvent::SubscriptionUpdated {
                subscription_id,
                status,
            } => {
                tracing::info!(
                    %subscription_id,
                    %status,
                    "Subscription updated upstream, mirror unchanged"
                );
            }
            WebhookEvent::Unhandled { event_type } => {
                tracing::info!(%event_type, "No handler configured for event type");
            }
            _ => {}
        }

        self.apply(decoded.action()).await
    }

    /// Apply a mirror action. Public so dispatch outcomes can be exercised
    /// without a signed payload.
    pub async fn apply(&self, action: MirrorAction) -> BillingResult<()> {
        match action {
            MirrorAction::Upsert(update) => {
                self.subscriptions.upsert_subscription(&update).await?;
            }
            MirrorAction::Delete { subscription_id } => {
                match self.subscriptions.find_subscription(&subscription_id).await? {
                    Some(_) => {
                        self.subscriptions.delete_subscription(&subscription_id).await?;
                        tracing::info!(%subscription_id, "Removed mirrored subscription");
                    }
                    None => {
                        // Redelivered deletions land here and must stay a success
                        tracing::info!(
                            %subscription_id,
                            "Subscription not tracked locally, nothing to delete"
                        );
                    }
                }
            }
            MirrorAction::Noop => {}
        }

        Ok(())
    }
}
