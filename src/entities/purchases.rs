use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;

/// Append-only audit of handed-out codes.
/// payment_reference is `free:<uuid>` for free claims and the checkout
/// session id for paid ones.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "purchases")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub deal_id: i32,
    pub discount_code_id: i32,
    pub code: String,
    pub customer_email: String,
    #[sea_orm(unique)]
    pub payment_reference: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
