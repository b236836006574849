use crate::config::StripeConfig;
use crate::error::{AppError, AppResult};
use crate::models::{CompletedCheckout, CustomerInfo};
use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use std::collections::HashMap;
use stripe::{
    CheckoutSession, CheckoutSessionMode, Client, CreateCheckoutSession,
    CreateCheckoutSessionLineItems, Event, EventObject, EventType, Subscription, SubscriptionId,
    UpdateSubscription, Webhook,
};

/// What the hosted checkout page needs to sell one unit of a deal.
#[derive(Debug, Clone)]
pub struct CheckoutSessionRequest {
    pub deal_id: i32,
    pub price_id: String,
    pub customer: Option<CustomerInfo>,
}

/// Subscription state as reported back by the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriptionState {
    pub subscription_id: String,
    pub current_period_end: Option<DateTime<Utc>>,
    pub cancel_at_period_end: bool,
}

/// Payment provider operations used by checkout and subscriptions.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Creates a hosted checkout session and returns its redirect URL.
    async fn create_checkout_session(&self, request: CheckoutSessionRequest) -> AppResult<String>;

    async fn cancel_subscription_at_period_end(
        &self,
        subscription_id: &str,
    ) -> AppResult<SubscriptionState>;

    /// Verifies the `Stripe-Signature` header against the raw payload.
    fn construct_event(&self, payload: &str, signature: &str) -> AppResult<Event>;
}

#[derive(Clone)]
pub struct StripeService {
    client: Client,
    config: StripeConfig,
}

impl StripeService {
    pub fn new(config: StripeConfig) -> Self {
        Self {
            client: Client::new(config.secret_key.clone()),
            config,
        }
    }
}

#[async_trait]
impl PaymentGateway for StripeService {
    async fn create_checkout_session(&self, request: CheckoutSessionRequest) -> AppResult<String> {
        let mut metadata = HashMap::new();
        metadata.insert("deal_id".to_string(), request.deal_id.to_string());
        if let Some(customer) = &request.customer {
            metadata.insert("customer_name".to_string(), customer.name.clone());
            metadata.insert("customer_email".to_string(), customer.email.clone());
            metadata.insert("customer_phone".to_string(), customer.phone.clone());
        }

        let mut params = CreateCheckoutSession::new();
        params.mode = Some(CheckoutSessionMode::Payment);
        params.success_url = Some(&self.config.success_url);
        params.cancel_url = Some(&self.config.cancel_url);
        params.line_items = Some(vec![CreateCheckoutSessionLineItems {
            price: Some(request.price_id.clone()),
            quantity: Some(1),
            ..Default::default()
        }]);
        params.metadata = Some(metadata);
        params.customer_email = request.customer.as_ref().map(|c| c.email.as_str());

        let session = CheckoutSession::create(&self.client, params).await?;
        log::info!(
            "Created checkout session {} for deal {}",
            session.id,
            request.deal_id
        );

        session.url.ok_or_else(|| {
            AppError::ExternalApiError(format!("Checkout session {} has no url", session.id))
        })
    }

    async fn cancel_subscription_at_period_end(
        &self,
        subscription_id: &str,
    ) -> AppResult<SubscriptionState> {
        let id: SubscriptionId = subscription_id
            .parse()
            .map_err(|_| AppError::ValidationError("Invalid subscription id".to_string()))?;

        let mut params = UpdateSubscription::new();
        params.cancel_at_period_end = Some(true);
        let subscription = Subscription::update(&self.client, &id, params).await?;

        Ok(SubscriptionState {
            subscription_id: subscription.id.to_string(),
            current_period_end: Utc
                .timestamp_opt(subscription.current_period_end, 0)
                .single(),
            cancel_at_period_end: subscription.cancel_at_period_end,
        })
    }

    fn construct_event(&self, payload: &str, signature: &str) -> AppResult<Event> {
        Webhook::construct_event(payload, signature, &self.config.webhook_secret).map_err(|e| {
            log::warn!("Webhook signature verification failed: {e}");
            AppError::AuthError("Invalid webhook signature".to_string())
        })
    }
}

/// Extracts the deal and customer from a `checkout.session.completed` event.
///
/// Returns `None` for other event types and for sessions that were not
/// created for a deal. Customer fields fall back to `customer_details` when
/// the session carries no metadata for them.
pub fn parse_completed_checkout(event: &Event) -> Option<CompletedCheckout> {
    if !matches!(event.type_, EventType::CheckoutSessionCompleted) {
        return None;
    }
    let EventObject::CheckoutSession(session) = &event.data.object else {
        return None;
    };

    let meta = |key: &str| session.metadata.as_ref().and_then(|m| m.get(key)).cloned();
    let details = session.customer_details.as_ref();

    let deal_id = meta("deal_id")?.parse().ok()?;
    let email = meta("customer_email")
        .or_else(|| details.and_then(|d| d.email.clone()))
        .or_else(|| session.customer_email.clone())?;

    Some(CompletedCheckout {
        session_id: session.id.to_string(),
        deal_id,
        customer: CustomerInfo {
            name: meta("customer_name")
                .or_else(|| details.and_then(|d| d.name.clone()))
                .unwrap_or_default(),
            email,
            phone: meta("customer_phone")
                .or_else(|| details.and_then(|d| d.phone.clone()))
                .unwrap_or_default(),
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    fn session(id: &str, extra: Value) -> Value {
        let mut object = json!({
            "id": id,
            "object": "checkout.session",
            "automatic_tax": { "enabled": false, "liability": null, "status": null },
            "created": 1_900_000_000,
            "expires_at": 1_900_086_400,
            "custom_fields": [],
            "custom_text": {
                "after_submit": null,
                "shipping_address": null,
                "submit": null,
                "terms_of_service_acceptance": null
            },
            "livemode": false,
            "mode": "payment",
            "payment_method_types": ["card"],
            "payment_status": "paid",
            "shipping_options": [],
            "status": "complete"
        });
        if let (Some(base), Value::Object(extra)) = (object.as_object_mut(), extra) {
            base.extend(extra);
        }
        object
    }

    fn event(event_type: &str, object: Value) -> Event {
        serde_json::from_value(json!({
            "id": "evt_1",
            "object": "event",
            "created": 1_900_000_000,
            "livemode": false,
            "pending_webhooks": 1,
            "request": null,
            "type": event_type,
            "data": { "object": object }
        }))
        .unwrap()
    }

    #[test]
    fn test_parse_completed_checkout_from_metadata() {
        let evt = event(
            "checkout.session.completed",
            session(
                "cs_test_123",
                json!({
                    "metadata": {
                        "deal_id": "42",
                        "customer_name": "Anna",
                        "customer_email": "anna@example.se",
                        "customer_phone": "0701234567"
                    }
                }),
            ),
        );

        let completed = parse_completed_checkout(&evt).unwrap();
        assert_eq!(completed.session_id, "cs_test_123");
        assert_eq!(completed.deal_id, 42);
        assert_eq!(completed.customer.name, "Anna");
        assert_eq!(completed.customer.phone, "0701234567");
    }

    #[test]
    fn test_parse_falls_back_to_customer_details() {
        let evt = event(
            "checkout.session.completed",
            session(
                "cs_test_456",
                json!({
                    "metadata": { "deal_id": "7" },
                    "customer_details": {
                        "email": "bo@example.se",
                        "name": "Bo",
                        "phone": "+46701234567"
                    }
                }),
            ),
        );

        let completed = parse_completed_checkout(&evt).unwrap();
        assert_eq!(completed.customer.email, "bo@example.se");
        assert_eq!(completed.customer.name, "Bo");
    }

    #[test]
    fn test_parse_ignores_unrelated_events() {
        let other = event("customer.created", json!({ "object": "customer", "id": "cus_1" }));
        assert!(parse_completed_checkout(&other).is_none());

        let no_deal = event(
            "checkout.session.completed",
            session(
                "cs_1",
                json!({ "metadata": {}, "customer_email": "x@y.se" }),
            ),
        );
        assert!(parse_completed_checkout(&no_deal).is_none());
    }

    #[test]
    fn test_expired_session_is_not_a_purchase() {
        let expired = event(
            "checkout.session.expired",
            session(
                "cs_2",
                json!({
                    "metadata": { "deal_id": "7", "customer_email": "x@y.se" },
                    "payment_status": "unpaid",
                    "status": "expired"
                }),
            ),
        );
        assert!(parse_completed_checkout(&expired).is_none());
    }
}
