use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{DeriveActiveEnum, EnumIter};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema, DeriveActiveEnum, EnumIter,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum DealStatus {
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "approved")]
    Approved,
    #[sea_orm(string_value = "rejected")]
    Rejected,
}

impl std::fmt::Display for DealStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DealStatus::Pending => write!(f, "pending"),
            DealStatus::Approved => write!(f, "approved"),
            DealStatus::Rejected => write!(f, "rejected"),
        }
    }
}

/// Salon offer.
/// - prices are in minor currency units (öre)
/// - quantity_left: remaining sellable units, never negative
/// - requires_discount_code: false means customers book directly via booking_url
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "deals")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub salon_id: i32,
    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub image_url: Option<String>,
    pub original_price: i64,
    pub discounted_price: i64,
    pub is_free: bool,
    pub category: String,
    pub city: String,
    pub is_active: bool,
    pub status: DealStatus,
    pub featured: bool,
    pub expires_at: Option<DateTime<Utc>>,
    pub quantity_left: i32,
    pub booking_url: Option<String>,
    pub requires_discount_code: bool,
    pub stripe_price_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Model {
    /// Free deals skip the payment provider entirely.
    pub fn is_free_deal(&self) -> bool {
        self.is_free || self.discounted_price == 0
    }

    pub fn is_sold_out(&self) -> bool {
        self.quantity_left <= 0
    }

    /// Listed to consumers: approved, switched on and not past its expiry.
    pub fn is_available_at(&self, now: DateTime<Utc>) -> bool {
        self.is_active
            && self.status == DealStatus::Approved
            && self.expires_at.is_none_or(|exp| exp > now)
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
