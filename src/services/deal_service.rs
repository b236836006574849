use crate::config::CodeConfig;
use crate::entities::{DealStatus, deal_entity as deal, salon_entity as salon};
use crate::error::{AppError, AppResult};
use crate::models::{
    AuthUser, CreateDealRequest, DealQuery, DealResponse, DealStatsResponse, PaginatedResponse,
    PaginationParams, UpdateDealRequest,
};
use crate::repositories::{
    DealRepository, DiscountCodeRepository, PurchaseRepository, SalonRepository,
};
use crate::services::discount_code_service::{MAX_ISSUE_QUANTITY, insert_fresh_codes};
use crate::utils::require_non_empty;
use chrono::Utc;
use sea_orm::{DatabaseConnection, IntoActiveModel, Set, TransactionTrait};

#[derive(Clone)]
pub struct DealService {
    pool: DatabaseConnection,
    codes: CodeConfig,
}

impl DealService {
    pub fn new(pool: DatabaseConnection, codes: CodeConfig) -> Self {
        Self { pool, codes }
    }

    /// Salons create pending deals on their own salon; admins create
    /// approved deals for any salon. Code-based deals get exactly
    /// `quantity` codes in the same transaction.
    pub async fn create_deal(
        &self,
        actor: &AuthUser,
        request: CreateDealRequest,
    ) -> AppResult<DealResponse> {
        let salon = if actor.is_admin() {
            let salon_id = request
                .salon_id
                .ok_or_else(|| AppError::ValidationError("salon_id is required".to_string()))?;
            SalonRepository::find_by_id(&self.pool, salon_id)
                .await?
                .ok_or_else(|| AppError::NotFound("Salon not found".to_string()))?
        } else {
            self.own_salon(actor).await?
        };
        validate_new_deal(&request, &salon)?;

        let status = if actor.is_admin() {
            DealStatus::Approved
        } else {
            DealStatus::Pending
        };
        let now = Utc::now();

        let txn = self.pool.begin().await?;
        let created = DealRepository::insert(
            &txn,
            deal::ActiveModel {
                salon_id: Set(salon.id),
                title: Set(request.title.trim().to_string()),
                description: Set(request.description),
                image_url: Set(request.image_url),
                original_price: Set(request.original_price),
                discounted_price: Set(request.discounted_price),
                is_free: Set(request.is_free),
                category: Set(request.category),
                city: Set(request.city),
                is_active: Set(true),
                status: Set(status),
                featured: Set(request.featured),
                expires_at: Set(request.expires_at),
                quantity_left: Set(request.quantity),
                booking_url: Set(request.booking_url),
                requires_discount_code: Set(request.requires_discount_code),
                stripe_price_id: Set(request.stripe_price_id),
                created_at: Set(now),
                updated_at: Set(now),
                ..Default::default()
            },
        )
        .await?;

        if created.requires_discount_code {
            insert_fresh_codes(&txn, created.id, request.quantity as u32, &self.codes).await?;
        }
        txn.commit().await?;

        log::info!(
            "Deal {} created for salon {} by user {} ({status})",
            created.id,
            salon.id,
            actor.user_id
        );
        Ok(created.into())
    }

    /// Owner or admin. A salon edit sends the deal back for approval.
    pub async fn update_deal(
        &self,
        actor: &AuthUser,
        deal_id: i32,
        request: UpdateDealRequest,
    ) -> AppResult<DealResponse> {
        let existing = self.authorize(actor, deal_id).await?;
        let salon = SalonRepository::find_by_id(&self.pool, existing.salon_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Salon not found".to_string()))?;
        validate_deal_update(&existing, &request, &salon)?;

        let mut am = existing.into_active_model();
        if let Some(title) = request.title {
            am.title = Set(title.trim().to_string());
        }
        if let Some(description) = request.description {
            am.description = Set(description);
        }
        if let Some(image_url) = request.image_url {
            am.image_url = Set(image_url);
        }
        if let Some(price) = request.original_price {
            am.original_price = Set(price);
        }
        if let Some(price) = request.discounted_price {
            am.discounted_price = Set(price);
        }
        if let Some(is_free) = request.is_free {
            am.is_free = Set(is_free);
        }
        if let Some(category) = request.category {
            am.category = Set(category);
        }
        if let Some(city) = request.city {
            am.city = Set(city);
        }
        if let Some(is_active) = request.is_active {
            am.is_active = Set(is_active);
        }
        if let Some(featured) = request.featured {
            am.featured = Set(featured);
        }
        if let Some(expires_at) = request.expires_at {
            am.expires_at = Set(expires_at);
        }
        if let Some(quantity_left) = request.quantity_left {
            am.quantity_left = Set(quantity_left);
        }
        if let Some(booking_url) = request.booking_url {
            am.booking_url = Set(booking_url);
        }
        if let Some(requires) = request.requires_discount_code {
            am.requires_discount_code = Set(requires);
        }
        if let Some(price_id) = request.stripe_price_id {
            am.stripe_price_id = Set(price_id);
        }
        if !actor.is_admin() {
            am.status = Set(DealStatus::Pending);
        }
        am.updated_at = Set(Utc::now());

        let updated = DealRepository::update(&self.pool, am).await?;
        Ok(updated.into())
    }

    pub async fn set_status(
        &self,
        actor: &AuthUser,
        deal_id: i32,
        status: DealStatus,
    ) -> AppResult<DealResponse> {
        if !actor.is_admin() {
            return Err(AppError::Forbidden);
        }
        if status == DealStatus::Pending {
            return Err(AppError::ValidationError(
                "Status must be approved or rejected".to_string(),
            ));
        }
        let existing = DealRepository::find_by_id(&self.pool, deal_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Deal not found".to_string()))?;

        let mut am = existing.into_active_model();
        am.status = Set(status);
        am.updated_at = Set(Utc::now());
        let updated = DealRepository::update(&self.pool, am).await?;

        log::info!("Deal {deal_id} set to {status} by admin {}", actor.user_id);
        Ok(updated.into())
    }

    pub async fn list_public(&self, query: &DealQuery) -> AppResult<PaginatedResponse<DealResponse>> {
        let params = PaginationParams::new(query.page, query.per_page);
        let (items, total) =
            DealRepository::list_public(&self.pool, query, &params, Utc::now()).await?;
        Ok(PaginatedResponse::new(
            items.into_iter().map(DealResponse::from).collect(),
            &params,
            total,
        ))
    }

    /// Publicly visible deal. Pending, rejected, inactive and expired deals
    /// read as missing.
    pub async fn get_deal(&self, deal_id: i32) -> AppResult<DealResponse> {
        DealRepository::find_by_id(&self.pool, deal_id)
            .await?
            .filter(|d| d.is_available_at(Utc::now()))
            .map(DealResponse::from)
            .ok_or_else(|| AppError::NotFound("Deal not found".to_string()))
    }

    pub async fn list_salon_deals(&self, actor: &AuthUser) -> AppResult<Vec<DealResponse>> {
        let salon = self.own_salon(actor).await?;
        let deals = DealRepository::list_for_salon(&self.pool, salon.id).await?;
        Ok(deals.into_iter().map(DealResponse::from).collect())
    }

    /// Removes the deal and its codes together.
    pub async fn delete_deal(&self, actor: &AuthUser, deal_id: i32) -> AppResult<()> {
        self.authorize(actor, deal_id).await?;

        let txn = self.pool.begin().await?;
        let codes = DiscountCodeRepository::delete_for_deals(&txn, &[deal_id]).await?;
        DealRepository::delete_by_ids(&txn, &[deal_id]).await?;
        txn.commit().await?;

        log::info!("Deal {deal_id} deleted with {codes} codes by user {}", actor.user_id);
        Ok(())
    }

    pub async fn salon_stats(&self, actor: &AuthUser) -> AppResult<Vec<DealStatsResponse>> {
        let salon = self.own_salon(actor).await?;
        let deals = DealRepository::list_for_salon(&self.pool, salon.id).await?;

        let mut stats = Vec::with_capacity(deals.len());
        for d in deals {
            let codes = DiscountCodeRepository::stats(&self.pool, d.id).await?;
            let purchases = PurchaseRepository::count_for_deal(&self.pool, d.id).await?;
            stats.push(DealStatsResponse {
                deal_id: d.id,
                title: d.title,
                status: d.status,
                quantity_left: d.quantity_left,
                codes,
                purchases,
            });
        }
        Ok(stats)
    }

    /// Loads a deal the actor may manage: admins any, salons their own.
    pub async fn authorize(&self, actor: &AuthUser, deal_id: i32) -> AppResult<deal::Model> {
        let existing = DealRepository::find_by_id(&self.pool, deal_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Deal not found".to_string()))?;
        if actor.is_admin() {
            return Ok(existing);
        }
        let salon = self.own_salon(actor).await?;
        if salon.id != existing.salon_id {
            return Err(AppError::Forbidden);
        }
        Ok(existing)
    }

    async fn own_salon(&self, actor: &AuthUser) -> AppResult<salon::Model> {
        SalonRepository::find_by_user(&self.pool, actor.user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Salon not found".to_string()))
    }
}

fn validate_prices(original: i64, discounted: i64) -> AppResult<()> {
    if original < 0 || discounted < 0 {
        return Err(AppError::ValidationError(
            "Prices must not be negative".to_string(),
        ));
    }
    if discounted > original {
        return Err(AppError::ValidationError(
            "Discounted price cannot exceed the original price".to_string(),
        ));
    }
    Ok(())
}

fn validate_code_requirement(
    requires_discount_code: bool,
    booking_url: Option<&str>,
    salon: &salon::Model,
) -> AppResult<()> {
    if requires_discount_code {
        if !salon.subscription_plan.allows_discount_codes() {
            return Err(AppError::ValidationError(
                "Discount codes require the premium plan".to_string(),
            ));
        }
    } else if booking_url.is_none_or(|u| u.trim().is_empty()) {
        return Err(AppError::ValidationError(
            "booking_url is required for deals without discount codes".to_string(),
        ));
    }
    Ok(())
}

pub fn validate_new_deal(request: &CreateDealRequest, salon: &salon::Model) -> AppResult<()> {
    require_non_empty(&request.title, "Title")?;
    require_non_empty(&request.category, "Category")?;
    require_non_empty(&request.city, "City")?;
    validate_prices(request.original_price, request.discounted_price)?;
    if request.quantity < 1 || request.quantity > MAX_ISSUE_QUANTITY as i32 {
        return Err(AppError::ValidationError(format!(
            "Quantity must be between 1 and {MAX_ISSUE_QUANTITY}"
        )));
    }
    validate_code_requirement(
        request.requires_discount_code,
        request.booking_url.as_deref(),
        salon,
    )
}

pub fn validate_deal_update(
    existing: &deal::Model,
    request: &UpdateDealRequest,
    salon: &salon::Model,
) -> AppResult<()> {
    if let Some(title) = &request.title {
        require_non_empty(title, "Title")?;
    }
    validate_prices(
        request.original_price.unwrap_or(existing.original_price),
        request.discounted_price.unwrap_or(existing.discounted_price),
    )?;
    if request.quantity_left.is_some_and(|q| q < 0) {
        return Err(AppError::ValidationError(
            "quantity_left must not be negative".to_string(),
        ));
    }
    if request.requires_discount_code.is_some() || request.booking_url.is_some() {
        validate_code_requirement(
            request
                .requires_discount_code
                .unwrap_or(existing.requires_discount_code),
            match &request.booking_url {
                Some(booking_url) => booking_url.as_deref(),
                None => existing.booking_url.as_deref(),
            },
            salon,
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::SubscriptionPlan;

    fn salon(plan: SubscriptionPlan) -> salon::Model {
        let now = Utc::now();
        salon::Model {
            id: 1,
            user_id: 1,
            name: "Salong Lyx".into(),
            email: "salong@example.se".into(),
            phone: None,
            address: None,
            city: Some("Stockholm".into()),
            subscription_plan: plan,
            subscription_type: None,
            stripe_subscription_id: None,
            current_period_end: None,
            cancel_at_period_end: false,
            created_at: now,
            updated_at: now,
        }
    }

    fn request() -> CreateDealRequest {
        CreateDealRequest {
            salon_id: None,
            title: "Klassisk ansiktsbehandling".into(),
            description: "60 min".into(),
            image_url: None,
            original_price: 89900,
            discounted_price: 49900,
            is_free: false,
            category: "Ansiktsbehandling".into(),
            city: "Stockholm".into(),
            featured: false,
            expires_at: None,
            quantity: 10,
            booking_url: None,
            requires_discount_code: true,
            stripe_price_id: Some("price_123".into()),
        }
    }

    #[test]
    fn test_valid_premium_deal() {
        assert!(validate_new_deal(&request(), &salon(SubscriptionPlan::Premiumpaket)).is_ok());
    }

    #[test]
    fn test_codes_need_premium_plan() {
        let err = validate_new_deal(&request(), &salon(SubscriptionPlan::Baspaket)).unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));

        let mut direct = request();
        direct.requires_discount_code = false;
        direct.booking_url = Some("https://boka.se/lyx".into());
        assert!(validate_new_deal(&direct, &salon(SubscriptionPlan::Baspaket)).is_ok());

        direct.booking_url = None;
        assert!(validate_new_deal(&direct, &salon(SubscriptionPlan::Baspaket)).is_err());
    }

    #[test]
    fn test_price_and_quantity_bounds() {
        let premium = salon(SubscriptionPlan::Premiumpaket);

        let mut req = request();
        req.discounted_price = req.original_price + 1;
        assert!(validate_new_deal(&req, &premium).is_err());

        let mut req = request();
        req.quantity = 0;
        assert!(validate_new_deal(&req, &premium).is_err());

        let mut req = request();
        req.quantity = 1001;
        assert!(validate_new_deal(&req, &premium).is_err());
    }
}
