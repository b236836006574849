mod common;

use common::*;
use lyxdeal_backend::entities::{
    DealStatus, SubscriptionPlan, UserRole, deal_entity as deal, discount_code_entity as dc,
    purchase_entity as purchase,
};
use lyxdeal_backend::error::AppError;
use lyxdeal_backend::models::{CheckoutDealRequest, CreateCheckoutSessionRequest};
use lyxdeal_backend::services::{CheckoutService, DiscountCodeService};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel,
    PaginatorTrait, QueryFilter, Set,
};
use std::sync::Arc;

struct Harness {
    db: DatabaseConnection,
    gateway: Arc<FakeGateway>,
    codes: DiscountCodeService,
    checkout: CheckoutService,
    salon_id: i32,
}

async fn harness() -> Harness {
    let db = setup_db().await;
    let owner = seed_user(&db, "owner@example.se", UserRole::Salon).await;
    let salon_id = seed_salon(&db, owner.id, SubscriptionPlan::Premiumpaket, None)
        .await
        .id;
    let gateway = Arc::new(FakeGateway::default());
    let codes = DiscountCodeService::new(db.clone(), code_config());
    let checkout = CheckoutService::new(db.clone(), gateway.clone(), codes.clone());
    Harness {
        db,
        gateway,
        codes,
        checkout,
        salon_id,
    }
}

fn checkout_request(deal_id: i32) -> CheckoutDealRequest {
    CheckoutDealRequest {
        deal_id,
        customer_info: customer("Anna Andersson", "anna@example.se"),
    }
}

async fn used_codes(db: &DatabaseConnection, deal_id: i32) -> u64 {
    dc::Entity::find()
        .filter(dc::Column::DealId.eq(deal_id))
        .filter(dc::Column::IsUsed.eq(true))
        .count(db)
        .await
        .unwrap()
}

#[tokio::test]
async fn test_free_deal_returns_code_directly() {
    let h = harness().await;
    let d = seed_deal(&h.db, h.salon_id, 2, None).await;
    h.codes.issue_codes(d.id, 2).await.unwrap();

    let response = h.checkout.checkout_deal(checkout_request(d.id)).await.unwrap();

    assert_eq!(response.free, Some(true));
    assert!(response.url.is_none());
    let code = response.code.unwrap();
    let stored = dc::Entity::find()
        .filter(dc::Column::Code.eq(code.as_str()))
        .one(&h.db)
        .await
        .unwrap()
        .unwrap();
    assert!(stored.is_used);
    assert!(h.gateway.sessions.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_paid_deal_redirects_without_claiming() {
    let h = harness().await;
    let d = seed_deal(&h.db, h.salon_id, 2, Some("price_123")).await;
    h.codes.issue_codes(d.id, 2).await.unwrap();

    let response = h.checkout.checkout_deal(checkout_request(d.id)).await.unwrap();

    assert_eq!(
        response.url.as_deref(),
        Some(format!("https://checkout.test/pay/{}", d.id).as_str())
    );
    assert!(response.code.is_none());
    assert_eq!(used_codes(&h.db, d.id).await, 0);

    let sessions = h.gateway.sessions.lock().unwrap();
    assert_eq!(sessions.len(), 1);
    assert_eq!(sessions[0].price_id, "price_123");
    assert_eq!(
        sessions[0].customer.as_ref().map(|c| c.email.as_str()),
        Some("anna@example.se")
    );
}

#[tokio::test]
async fn test_unavailable_deals_read_as_missing() {
    let h = harness().await;
    let d = seed_deal(&h.db, h.salon_id, 2, None).await;
    let mut am = d.clone().into_active_model();
    am.status = Set(DealStatus::Pending);
    am.update(&h.db).await.unwrap();

    let err = h.checkout.checkout_deal(checkout_request(d.id)).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    let err = h.checkout.checkout_deal(checkout_request(777)).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn test_sold_out_deal_is_rejected_before_payment() {
    let h = harness().await;
    let d = seed_deal(&h.db, h.salon_id, 0, Some("price_123")).await;

    let err = h.checkout.checkout_deal(checkout_request(d.id)).await.unwrap_err();

    assert!(matches!(err, AppError::SoldOut(_)));
    assert!(h.gateway.sessions.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_invalid_customer_is_rejected() {
    let h = harness().await;
    let d = seed_deal(&h.db, h.salon_id, 2, None).await;
    h.codes.issue_codes(d.id, 2).await.unwrap();

    let mut request = checkout_request(d.id);
    request.customer_info.phone = "abc".to_string();
    let err = h.checkout.checkout_deal(request).await.unwrap_err();

    assert!(matches!(err, AppError::ValidationError(_)));
    assert_eq!(used_codes(&h.db, d.id).await, 0);
}

#[tokio::test]
async fn test_checkout_session_only_for_priced_deals() {
    let h = harness().await;
    let free = seed_deal(&h.db, h.salon_id, 2, None).await;
    let unpriced = seed_deal(&h.db, h.salon_id, 2, Some("  ")).await;
    let paid = seed_deal(&h.db, h.salon_id, 2, Some("price_123")).await;

    let err = h
        .checkout
        .create_checkout_session(CreateCheckoutSessionRequest { deal_id: free.id })
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::ValidationError(_)));

    let err = h
        .checkout
        .create_checkout_session(CreateCheckoutSessionRequest { deal_id: unpriced.id })
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::ValidationError(_)));

    let response = h
        .checkout
        .create_checkout_session(CreateCheckoutSessionRequest { deal_id: paid.id })
        .await
        .unwrap();
    assert!(response.url.is_some());
    let sessions = h.gateway.sessions.lock().unwrap();
    assert!(sessions[0].customer.is_none());
}

#[tokio::test]
async fn test_direct_booking_deal_has_no_checkout() {
    let h = harness().await;
    let d = seed_deal(&h.db, h.salon_id, 2, None).await;
    let mut am = d.clone().into_active_model();
    am.requires_discount_code = Set(false);
    am.update(&h.db).await.unwrap();

    let err = h.checkout.checkout_deal(checkout_request(d.id)).await.unwrap_err();
    assert!(matches!(err, AppError::ValidationError(_)));
}

#[tokio::test]
async fn test_completed_checkout_webhook_claims_once() {
    let h = harness().await;
    let d = seed_deal(&h.db, h.salon_id, 2, Some("price_123")).await;
    h.codes.issue_codes(d.id, 2).await.unwrap();

    let payload = completed_checkout_event("cs_test_42", d.id, "anna@example.se");
    let event = h.checkout.verify_webhook(&payload, "valid").unwrap();
    let outcome = h.checkout.handle_event(&event).await.unwrap().unwrap();
    assert_eq!(outcome.payment_reference, "cs_test_42");
    assert!(!outcome.already_claimed);

    // provider redelivery
    let event = h.checkout.verify_webhook(&payload, "valid").unwrap();
    let again = h.checkout.handle_event(&event).await.unwrap().unwrap();
    assert!(again.already_claimed);
    assert_eq!(again.code, outcome.code);

    let stored = deal::Entity::find_by_id(d.id).one(&h.db).await.unwrap().unwrap();
    assert_eq!(stored.quantity_left, 1);
    assert_eq!(purchase::Entity::find().count(&h.db).await.unwrap(), 1);
}

#[tokio::test]
async fn test_bad_signature_and_unrelated_events() {
    let h = harness().await;
    let payload = completed_checkout_event("cs_test_1", 1, "anna@example.se");

    assert!(matches!(
        h.checkout.verify_webhook(&payload, "forged"),
        Err(AppError::AuthError(_))
    ));

    let event = h
        .checkout
        .verify_webhook(&customer_created_event(), "valid")
        .unwrap();
    assert!(h.checkout.handle_event(&event).await.unwrap().is_none());
}

#[tokio::test]
async fn test_webhook_with_bad_email_is_rejected() {
    let h = harness().await;
    let d = seed_deal(&h.db, h.salon_id, 2, Some("price_123")).await;
    h.codes.issue_codes(d.id, 2).await.unwrap();

    let payload = completed_checkout_event("cs_test_9", d.id, "nobody");
    let event = h.checkout.verify_webhook(&payload, "valid").unwrap();
    let err = h.checkout.handle_event(&event).await.unwrap_err();

    assert!(matches!(err, AppError::ValidationError(_)));
    assert_eq!(used_codes(&h.db, d.id).await, 0);
}

#[tokio::test]
async fn test_payment_after_sell_out_is_reported_not_fulfilled() {
    let h = harness().await;
    let d = seed_deal(&h.db, h.salon_id, 1, Some("price_123")).await;
    h.codes.issue_codes(d.id, 2).await.unwrap();

    let first = completed_checkout_event("cs_test_first", d.id, "anna@example.se");
    let event = h.checkout.verify_webhook(&first, "valid").unwrap();
    h.checkout.handle_event(&event).await.unwrap().unwrap();

    // second buyer paid while the last unit was being claimed
    let late = completed_checkout_event("cs_test_late", d.id, "bo@example.se");
    let event = h.checkout.verify_webhook(&late, "valid").unwrap();
    let err = h.checkout.handle_event(&event).await.unwrap_err();
    assert!(matches!(err, AppError::SoldOut(_)));

    assert_eq!(used_codes(&h.db, d.id).await, 1);
    let purchases = purchase::Entity::find().all(&h.db).await.unwrap();
    assert_eq!(purchases.len(), 1);
    assert_eq!(purchases[0].customer_email, "anna@example.se");
}
