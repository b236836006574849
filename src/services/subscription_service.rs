use crate::error::{AppError, AppResult};
use crate::external::PaymentGateway;
use crate::models::{
    AuthUser, CancelSubscriptionRequest, CancelSubscriptionResponse, SalonResponse,
    UpdateSalonSubscriptionRequest,
};
use crate::repositories::SalonRepository;
use crate::utils::require_non_empty;
use chrono::Utc;
use sea_orm::{DatabaseConnection, IntoActiveModel, Set};
use std::sync::Arc;

#[derive(Clone)]
pub struct SubscriptionService {
    pool: DatabaseConnection,
    gateway: Arc<dyn PaymentGateway>,
}

impl SubscriptionService {
    pub fn new(pool: DatabaseConnection, gateway: Arc<dyn PaymentGateway>) -> Self {
        Self { pool, gateway }
    }

    /// Stops renewal at the end of the paid period and mirrors the
    /// provider's answer onto the salon.
    pub async fn cancel_subscription(
        &self,
        actor: &AuthUser,
        request: CancelSubscriptionRequest,
    ) -> AppResult<CancelSubscriptionResponse> {
        require_non_empty(&request.subscription_id, "subscription_id")?;
        let salon = SalonRepository::find_by_subscription_id(&self.pool, &request.subscription_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Subscription not found".to_string()))?;
        if !actor.is_admin() && salon.user_id != actor.user_id {
            return Err(AppError::Forbidden);
        }

        let state = self
            .gateway
            .cancel_subscription_at_period_end(&request.subscription_id)
            .await?;

        let salon_id = salon.id;
        let mut am = salon.into_active_model();
        am.cancel_at_period_end = Set(state.cancel_at_period_end);
        am.current_period_end = Set(state.current_period_end);
        am.updated_at = Set(Utc::now());
        SalonRepository::update(&self.pool, am).await?;

        log::info!(
            "Subscription {} of salon {salon_id} set to cancel at period end",
            state.subscription_id
        );
        Ok(CancelSubscriptionResponse {
            success: true,
            subscription_id: state.subscription_id,
            current_period_end: state.current_period_end,
            cancel_at_period_end: state.cancel_at_period_end,
        })
    }

    /// Admin change of a salon's plan, verified by reading the row back.
    pub async fn update_salon_subscription(
        &self,
        actor: &AuthUser,
        request: UpdateSalonSubscriptionRequest,
    ) -> AppResult<SalonResponse> {
        if !actor.is_admin() {
            return Err(AppError::Forbidden);
        }
        let salon = SalonRepository::find_by_id(&self.pool, request.salon_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Salon not found".to_string()))?;

        let mut am = salon.into_active_model();
        am.subscription_plan = Set(request.subscription_plan);
        am.subscription_type = Set(request.subscription_type.clone());
        am.updated_at = Set(Utc::now());
        SalonRepository::update(&self.pool, am).await?;

        let stored = SalonRepository::find_by_id(&self.pool, request.salon_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Salon not found".to_string()))?;
        if stored.subscription_plan != request.subscription_plan
            || stored.subscription_type != request.subscription_type
        {
            return Err(AppError::InternalError(format!(
                "Subscription update for salon {} did not persist",
                request.salon_id
            )));
        }

        log::info!(
            "Salon {} moved to {} by admin {}",
            stored.id,
            stored.subscription_plan,
            actor.user_id
        );
        Ok(stored.into())
    }
}
