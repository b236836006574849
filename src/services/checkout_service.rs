use crate::entities::deal_entity;
use crate::error::{AppError, AppResult};
use crate::external::{CheckoutSessionRequest, PaymentGateway, parse_completed_checkout};
use crate::models::{
    CheckoutDealRequest, CheckoutResponse, ClaimOutcome, CompletedCheckout,
    CreateCheckoutSessionRequest, CustomerInfo,
};
use crate::repositories::DealRepository;
use crate::services::discount_code_service::{DiscountCodeService, validate_customer};
use chrono::Utc;
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use stripe::Event;

/// Entry point for consumers securing a deal.
///
/// Free deals are claimed immediately; paid deals get a hosted checkout
/// session and are claimed when the provider reports the payment through
/// the webhook.
#[derive(Clone)]
pub struct CheckoutService {
    pool: DatabaseConnection,
    gateway: Arc<dyn PaymentGateway>,
    discount_codes: DiscountCodeService,
}

impl CheckoutService {
    pub fn new(
        pool: DatabaseConnection,
        gateway: Arc<dyn PaymentGateway>,
        discount_codes: DiscountCodeService,
    ) -> Self {
        Self {
            pool,
            gateway,
            discount_codes,
        }
    }

    pub async fn checkout_deal(&self, request: CheckoutDealRequest) -> AppResult<CheckoutResponse> {
        validate_customer(&request.customer_info)?;
        let deal = self.sellable_deal(request.deal_id).await?;

        if deal.is_free_deal() {
            let outcome = self
                .discount_codes
                .claim_code(deal.id, request.customer_info)
                .await?;
            return Ok(CheckoutResponse::free_code(outcome.code));
        }

        let url = self
            .start_paid_session(&deal, Some(request.customer_info))
            .await?;
        Ok(CheckoutResponse::redirect(url))
    }

    /// Paid checkout without customer details; the hosted page collects them.
    pub async fn create_checkout_session(
        &self,
        request: CreateCheckoutSessionRequest,
    ) -> AppResult<CheckoutResponse> {
        let deal = self.sellable_deal(request.deal_id).await?;
        if deal.is_free_deal() {
            return Err(AppError::ValidationError(
                "Free deals do not need a checkout session".to_string(),
            ));
        }
        let url = self.start_paid_session(&deal, None).await?;
        Ok(CheckoutResponse::redirect(url))
    }

    pub fn verify_webhook(&self, payload: &str, signature: &str) -> AppResult<Event> {
        self.gateway.construct_event(payload, signature)
    }

    /// Applies a verified webhook event. Events that are not completed deal
    /// checkouts are acknowledged without effect.
    pub async fn handle_event(&self, event: &Event) -> AppResult<Option<ClaimOutcome>> {
        match parse_completed_checkout(event) {
            Some(completed) => Ok(Some(self.handle_checkout_completed(completed).await?)),
            None => {
                log::info!("Ignoring webhook event {} ({:?})", event.id, event.type_);
                Ok(None)
            }
        }
    }

    /// Claims the code a completed checkout paid for. A payment that lands
    /// after the last unit went elsewhere is logged as a refund candidate.
    pub async fn handle_checkout_completed(
        &self,
        completed: CompletedCheckout,
    ) -> AppResult<ClaimOutcome> {
        let result = self
            .discount_codes
            .claim_paid(completed.deal_id, completed.customer.clone(), &completed.session_id)
            .await;
        if let Err(AppError::SoldOut(_)) = &result {
            log::error!(
                "Refund candidate: checkout session {} paid for deal {} by {} but the deal is sold out",
                completed.session_id,
                completed.deal_id,
                completed.customer.email
            );
        }
        result
    }

    async fn sellable_deal(&self, deal_id: i32) -> AppResult<deal_entity::Model> {
        let deal = DealRepository::find_by_id(&self.pool, deal_id)
            .await?
            .filter(|d| d.is_available_at(Utc::now()))
            .ok_or_else(|| AppError::NotFound("Deal not found".to_string()))?;

        if !deal.requires_discount_code {
            return Err(AppError::ValidationError(
                "This deal is booked directly with the salon".to_string(),
            ));
        }
        if deal.is_sold_out() {
            return Err(AppError::sold_out());
        }
        Ok(deal)
    }

    async fn start_paid_session(
        &self,
        deal: &deal_entity::Model,
        customer: Option<CustomerInfo>,
    ) -> AppResult<String> {
        let price_id = deal
            .stripe_price_id
            .clone()
            .filter(|p| !p.trim().is_empty())
            .ok_or_else(|| {
                AppError::ValidationError("Deal has no price configured".to_string())
            })?;

        self.gateway
            .create_checkout_session(CheckoutSessionRequest {
                deal_id: deal.id,
                price_id,
                customer,
            })
            .await
    }
}
