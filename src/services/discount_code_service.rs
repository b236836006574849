use crate::config::CodeConfig;
use crate::error::{AppError, AppResult};
use crate::models::{ClaimOutcome, CodeStats, CustomerInfo, DiscountCodeResponse};
use crate::repositories::{
    DealRepository, DiscountCodeRepository, PurchaseRepository, is_unique_violation,
};
use crate::services::notification_service::{NotificationService, claim_confirmation};
use crate::utils::{generate_code_batch, require_non_empty, validate_email, validate_phone};
use chrono::Utc;
use sea_orm::{ConnectionTrait, DatabaseConnection, TransactionTrait};
use uuid::Uuid;

pub const MAX_ISSUE_QUANTITY: u32 = 1000;
const ISSUE_ATTEMPTS: u32 = 3;
const CLAIM_ATTEMPTS: u32 = 5;

#[derive(Clone)]
pub struct DiscountCodeService {
    pool: DatabaseConnection,
    codes: CodeConfig,
}

impl DiscountCodeService {
    pub fn new(pool: DatabaseConnection, codes: CodeConfig) -> Self {
        Self { pool, codes }
    }

    pub fn default_batch(&self) -> u32 {
        self.codes.default_batch
    }

    /// Adds `quantity` unused codes to a deal. Stock (`quantity_left`) is
    /// left alone; calling again issues additional codes.
    pub async fn issue_codes(&self, deal_id: i32, quantity: u32) -> AppResult<Vec<String>> {
        if !(1..=MAX_ISSUE_QUANTITY).contains(&quantity) {
            return Err(AppError::ValidationError(format!(
                "Quantity must be between 1 and {MAX_ISSUE_QUANTITY}"
            )));
        }

        let txn = self.pool.begin().await?;
        if DealRepository::find_by_id(&txn, deal_id).await?.is_none() {
            return Err(AppError::NotFound("Deal not found".to_string()));
        }
        let codes = insert_fresh_codes(&txn, deal_id, quantity, &self.codes).await?;
        txn.commit().await?;

        log::info!("Issued {} codes for deal {deal_id}", codes.len());
        Ok(codes)
    }

    /// Hands one code of a free deal to `customer`.
    pub async fn claim_code(&self, deal_id: i32, customer: CustomerInfo) -> AppResult<ClaimOutcome> {
        validate_customer(&customer)?;
        let reference = format!("free:{}", Uuid::new_v4());
        self.claim(deal_id, &customer, &reference).await
    }

    /// Hands one code to the buyer of a completed checkout.
    ///
    /// Keyed by `payment_reference`: a reference that already has a purchase
    /// gets its earlier code back and no row changes.
    pub async fn claim_paid(
        &self,
        deal_id: i32,
        customer: CustomerInfo,
        payment_reference: &str,
    ) -> AppResult<ClaimOutcome> {
        require_non_empty(payment_reference, "Payment reference")?;
        if let Some(outcome) = self.existing_claim(payment_reference).await? {
            return Ok(outcome);
        }
        validate_email(&customer.email)?;

        match self.claim(deal_id, &customer, payment_reference).await {
            Err(AppError::DatabaseError(e)) if is_unique_violation(&e) => {
                // a concurrent delivery of the same event got there first
                self.existing_claim(payment_reference)
                    .await?
                    .ok_or(AppError::DatabaseError(e))
            }
            other => other,
        }
    }

    pub async fn list_codes(&self, deal_id: i32) -> AppResult<Vec<DiscountCodeResponse>> {
        let codes = DiscountCodeRepository::list_for_deal(&self.pool, deal_id).await?;
        Ok(codes.into_iter().map(DiscountCodeResponse::from).collect())
    }

    pub async fn code_stats(&self, deal_id: i32) -> AppResult<CodeStats> {
        Ok(DiscountCodeRepository::stats(&self.pool, deal_id).await?)
    }

    async fn existing_claim(&self, payment_reference: &str) -> AppResult<Option<ClaimOutcome>> {
        let purchase =
            PurchaseRepository::find_by_payment_reference(&self.pool, payment_reference).await?;
        Ok(purchase.map(|p| {
            log::info!("Payment {payment_reference} already fulfilled with code {}", p.code);
            ClaimOutcome {
                deal_id: p.deal_id,
                discount_code_id: p.discount_code_id,
                code: p.code,
                payment_reference: p.payment_reference,
                already_claimed: true,
            }
        }))
    }

    /// Stock decrement, code assignment, purchase record and confirmation
    /// email all commit together or not at all.
    async fn claim(
        &self,
        deal_id: i32,
        customer: &CustomerInfo,
        payment_reference: &str,
    ) -> AppResult<ClaimOutcome> {
        let txn = self.pool.begin().await?;

        let deal = DealRepository::find_by_id(&txn, deal_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Deal not found".to_string()))?;

        if !DealRepository::take_one(&txn, deal_id).await? {
            txn.rollback().await?;
            return Err(AppError::sold_out());
        }

        let now = Utc::now();
        let mut claimed = None;
        for attempt in 1..=CLAIM_ATTEMPTS {
            let Some(candidate) = DiscountCodeRepository::find_first_unclaimed(&txn, deal_id).await?
            else {
                break;
            };
            if DiscountCodeRepository::mark_claimed(&txn, candidate.id, customer, now).await? {
                claimed = Some(candidate);
                break;
            }
            log::debug!(
                "Code {} of deal {deal_id} taken concurrently (attempt {attempt})",
                candidate.id
            );
        }

        let Some(code) = claimed else {
            txn.rollback().await?;
            log::warn!("Deal {deal_id} has stock left but no unused codes");
            return Err(AppError::sold_out());
        };

        PurchaseRepository::insert(
            &txn,
            deal_id,
            code.id,
            &code.code,
            &customer.email,
            payment_reference,
        )
        .await?;

        let (subject, body) =
            claim_confirmation(&deal.title, &code.code, deal.booking_url.as_deref());
        NotificationService::enqueue(&txn, &customer.email, &subject, &body).await?;

        txn.commit().await?;
        log::info!("Claimed code {} of deal {deal_id} ({payment_reference})", code.id);

        Ok(ClaimOutcome {
            deal_id,
            discount_code_id: code.id,
            code: code.code,
            payment_reference: payment_reference.to_string(),
            already_claimed: false,
        })
    }
}

pub fn validate_customer(customer: &CustomerInfo) -> AppResult<()> {
    require_non_empty(&customer.name, "Name")?;
    validate_email(&customer.email)?;
    validate_phone(&customer.phone)?;
    Ok(())
}

/// Inserts `quantity` new codes for a deal inside `conn`.
///
/// Each attempt runs in its own savepoint so a unique-index collision only
/// discards that batch.
pub async fn insert_fresh_codes<C>(
    conn: &C,
    deal_id: i32,
    quantity: u32,
    config: &CodeConfig,
) -> AppResult<Vec<String>>
where
    C: ConnectionTrait + TransactionTrait,
{
    let mut attempt = 0;
    loop {
        attempt += 1;
        let codes = generate_code_batch(quantity as usize, config.length, config.alphabet)?;
        let savepoint = conn.begin().await?;
        match DiscountCodeRepository::insert_batch(&savepoint, deal_id, &codes, Utc::now()).await {
            Ok(_) => {
                savepoint.commit().await?;
                return Ok(codes);
            }
            Err(e) => {
                savepoint.rollback().await?;
                if !is_unique_violation(&e) || attempt >= ISSUE_ATTEMPTS {
                    return Err(e.into());
                }
                log::warn!("Code collision for deal {deal_id}, regenerating batch ({attempt})");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn customer(name: &str, email: &str, phone: &str) -> CustomerInfo {
        CustomerInfo {
            name: name.to_string(),
            email: email.to_string(),
            phone: phone.to_string(),
        }
    }

    #[test]
    fn test_validate_customer() {
        assert!(validate_customer(&customer("Anna", "anna@example.se", "070-123 45 67")).is_ok());
        assert!(validate_customer(&customer(" ", "anna@example.se", "0701234567")).is_err());
        assert!(validate_customer(&customer("Anna", "anna.example.se", "0701234567")).is_err());
        assert!(validate_customer(&customer("Anna", "anna@example.se", "12")).is_err());
    }
}
