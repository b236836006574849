#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use lyxdeal_backend::config::{CodeConfig, NotificationConfig};
use lyxdeal_backend::entities::{
    DealStatus, SubscriptionPlan, UserRole, deal_entity as deal, salon_entity as salon,
    user_entity as user,
};
use lyxdeal_backend::error::{AppError, AppResult};
use lyxdeal_backend::external::{
    CheckoutSessionRequest, EmailSender, PaymentGateway, SubscriptionState,
};
use lyxdeal_backend::models::{AuthUser, CustomerInfo};
use lyxdeal_backend::utils::CodeAlphabet;
use migration::{Migrator, MigratorTrait};
use sea_orm::{ActiveModelTrait, ConnectOptions, Database, DatabaseConnection, Set};
use serde_json::{Value, json};
use std::sync::Mutex;
use std::sync::atomic::{AtomicU32, Ordering};

pub const PASSWORD: &str = "Password123";

/// Fresh in-memory database with every migration applied. A single
/// connection keeps all callers on the same in-memory database.
pub async fn setup_db() -> DatabaseConnection {
    let mut options = ConnectOptions::new("sqlite::memory:".to_string());
    options
        .max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);
    let db = Database::connect(options).await.expect("connect sqlite");
    Migrator::up(&db, None).await.expect("run migrations");
    db
}

pub fn code_config() -> CodeConfig {
    CodeConfig {
        length: 8,
        alphabet: CodeAlphabet::Unambiguous,
        default_batch: 10,
    }
}

pub fn notification_config(max_attempts: u32) -> NotificationConfig {
    NotificationConfig {
        poll_interval_secs: 1,
        max_attempts,
        initial_backoff_secs: 30,
        max_backoff_secs: 3600,
        batch_size: 50,
    }
}

pub fn customer(name: &str, email: &str) -> CustomerInfo {
    CustomerInfo {
        name: name.to_string(),
        email: email.to_string(),
        phone: "070-123 45 67".to_string(),
    }
}

pub fn fixed_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2030, 1, 31, 12, 0, 0).unwrap()
}

pub async fn seed_user(db: &DatabaseConnection, email: &str, role: UserRole) -> user::Model {
    let now = Utc::now();
    user::ActiveModel {
        email: Set(email.to_string()),
        password_hash: Set(bcrypt::hash(PASSWORD, 4).unwrap()),
        role: Set(role),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap()
}

pub async fn seed_salon(
    db: &DatabaseConnection,
    user_id: i32,
    plan: SubscriptionPlan,
    subscription_id: Option<&str>,
) -> salon::Model {
    let now = Utc::now();
    salon::ActiveModel {
        user_id: Set(user_id),
        name: Set(format!("Salong {user_id}")),
        email: Set(format!("salong{user_id}@example.se")),
        phone: Set(None),
        address: Set(None),
        city: Set(Some("Stockholm".to_string())),
        subscription_plan: Set(plan),
        subscription_type: Set(Some("monthly".to_string())),
        stripe_subscription_id: Set(subscription_id.map(str::to_string)),
        current_period_end: Set(None),
        cancel_at_period_end: Set(false),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap()
}

/// Approved, active deal. Free when `price_id` is `None`.
pub async fn seed_deal(
    db: &DatabaseConnection,
    salon_id: i32,
    quantity_left: i32,
    price_id: Option<&str>,
) -> deal::Model {
    let now = Utc::now();
    let is_free = price_id.is_none();
    deal::ActiveModel {
        salon_id: Set(salon_id),
        title: Set("Klassisk ansiktsbehandling".to_string()),
        description: Set("60 minuter".to_string()),
        image_url: Set(None),
        original_price: Set(89900),
        discounted_price: Set(if is_free { 0 } else { 49900 }),
        is_free: Set(is_free),
        category: Set("Ansiktsbehandling".to_string()),
        city: Set("Stockholm".to_string()),
        is_active: Set(true),
        status: Set(DealStatus::Approved),
        featured: Set(false),
        expires_at: Set(None),
        quantity_left: Set(quantity_left),
        booking_url: Set(Some("https://boka.example.se".to_string())),
        requires_discount_code: Set(true),
        stripe_price_id: Set(price_id.map(str::to_string)),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap()
}

pub fn admin(user: &user::Model) -> AuthUser {
    AuthUser {
        user_id: user.id,
        role: UserRole::Admin,
    }
}

pub fn salon_user(user: &user::Model) -> AuthUser {
    AuthUser {
        user_id: user.id,
        role: UserRole::Salon,
    }
}

/// Payment provider double. Accepts webhooks signed with `"valid"`.
#[derive(Default)]
pub struct FakeGateway {
    pub sessions: Mutex<Vec<CheckoutSessionRequest>>,
    pub cancelled: Mutex<Vec<String>>,
}

#[async_trait]
impl PaymentGateway for FakeGateway {
    async fn create_checkout_session(&self, request: CheckoutSessionRequest) -> AppResult<String> {
        let url = format!("https://checkout.test/pay/{}", request.deal_id);
        self.sessions.lock().unwrap().push(request);
        Ok(url)
    }

    async fn cancel_subscription_at_period_end(
        &self,
        subscription_id: &str,
    ) -> AppResult<SubscriptionState> {
        self.cancelled
            .lock()
            .unwrap()
            .push(subscription_id.to_string());
        Ok(SubscriptionState {
            subscription_id: subscription_id.to_string(),
            current_period_end: Some(fixed_time()),
            cancel_at_period_end: true,
        })
    }

    fn construct_event(&self, payload: &str, signature: &str) -> AppResult<stripe::Event> {
        if signature != "valid" {
            return Err(AppError::AuthError("Invalid webhook signature".to_string()));
        }
        Ok(serde_json::from_str(payload)?)
    }
}

/// Email provider double that fails the first `failures` sends.
#[derive(Default)]
pub struct FakeEmail {
    pub failures: AtomicU32,
    pub sent: Mutex<Vec<(String, String)>>,
}

impl FakeEmail {
    pub fn failing(times: u32) -> Self {
        Self {
            failures: AtomicU32::new(times),
            sent: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl EmailSender for FakeEmail {
    async fn send(&self, to: &str, subject: &str, _body: &str) -> AppResult<()> {
        let remaining = self.failures.load(Ordering::SeqCst);
        if remaining > 0 {
            self.failures.store(remaining - 1, Ordering::SeqCst);
            return Err(AppError::ExternalApiError("provider down".to_string()));
        }
        self.sent
            .lock()
            .unwrap()
            .push((to.to_string(), subject.to_string()));
        Ok(())
    }
}

/// Signed-event envelope as the provider posts it.
pub fn stripe_event(event_id: &str, event_type: &str, object: Value) -> String {
    json!({
        "id": event_id,
        "object": "event",
        "api_version": null,
        "created": 1_900_000_000,
        "livemode": false,
        "pending_webhooks": 1,
        "request": null,
        "type": event_type,
        "data": { "object": object }
    })
    .to_string()
}

/// Paid checkout session object; `extra` overrides or adds fields.
pub fn checkout_session(session_id: &str, extra: Value) -> Value {
    let mut object = json!({
        "id": session_id,
        "object": "checkout.session",
        "amount_subtotal": 49_900,
        "amount_total": 49_900,
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

pub fn completed_checkout_event(session_id: &str, deal_id: i32, email: &str) -> String {
    stripe_event(
        &format!("evt_{session_id}"),
        "checkout.session.completed",
        checkout_session(
            session_id,
            json!({
                "metadata": {
                    "deal_id": deal_id.to_string(),
                    "customer_name": "Anna Andersson",
                    "customer_email": email,
                    "customer_phone": "0701234567"
                }
            }),
        ),
    )
}

/// An event the webhook has no business with.
pub fn customer_created_event() -> String {
    stripe_event(
        "evt_customer_1",
        "customer.created",
        json!({ "object": "customer", "id": "cus_1", "email": "anna@example.se" }),
    )
}
