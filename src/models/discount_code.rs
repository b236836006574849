use crate::entities::discount_code_entity;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DiscountCodeResponse {
    pub id: i32,
    pub deal_id: i32,
    pub code: String,
    pub is_used: bool,
    pub created_at: DateTime<Utc>,
    pub used_at: Option<DateTime<Utc>>,
    pub customer_name: Option<String>,
    pub customer_email: Option<String>,
    pub customer_phone: Option<String>,
}

impl From<discount_code_entity::Model> for DiscountCodeResponse {
    fn from(m: discount_code_entity::Model) -> Self {
        Self {
            id: m.id,
            deal_id: m.deal_id,
            code: m.code,
            is_used: m.is_used,
            created_at: m.created_at,
            used_at: m.used_at,
            customer_name: m.customer_name,
            customer_email: m.customer_email,
            customer_phone: m.customer_phone,
        }
    }
}

/// Customer contact details attached to a code when it is claimed.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct CustomerInfo {
    #[schema(example = "Anna Andersson")]
    pub name: String,
    #[schema(example = "anna@example.se")]
    pub email: String,
    #[schema(example = "070-123 45 67")]
    pub phone: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct IssueCodesRequest {
    /// Defaults to the configured batch size (10).
    pub quantity: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct IssueCodesResponse {
    pub deal_id: i32,
    pub issued: usize,
    pub codes: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct CodeStats {
    pub total: u64,
    pub used: u64,
    pub unused: u64,
}

/// Result of a successful claim.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ClaimOutcome {
    pub deal_id: i32,
    pub discount_code_id: i32,
    pub code: String,
    pub payment_reference: String,
    /// True when the payment reference had already been fulfilled earlier.
    pub already_claimed: bool,
}
