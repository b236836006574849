use crate::entities::{SubscriptionPlan, salon_entity};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SalonResponse {
    pub id: i32,
    pub user_id: i32,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub subscription_plan: SubscriptionPlan,
    pub subscription_type: Option<String>,
    pub current_period_end: Option<DateTime<Utc>>,
    pub cancel_at_period_end: bool,
}

impl From<salon_entity::Model> for SalonResponse {
    fn from(m: salon_entity::Model) -> Self {
        Self {
            id: m.id,
            user_id: m.user_id,
            name: m.name,
            email: m.email,
            phone: m.phone,
            address: m.address,
            city: m.city,
            subscription_plan: m.subscription_plan,
            subscription_type: m.subscription_type,
            current_period_end: m.current_period_end,
            cancel_at_period_end: m.cancel_at_period_end,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CancelSubscriptionRequest {
    #[schema(example = "sub_1PqExample")]
    pub subscription_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct CancelSubscriptionResponse {
    pub success: bool,
    pub subscription_id: String,
    pub current_period_end: Option<DateTime<Utc>>,
    pub cancel_at_period_end: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UpdateSalonSubscriptionRequest {
    pub salon_id: i32,
    pub subscription_plan: SubscriptionPlan,
    pub subscription_type: Option<String>,
}
