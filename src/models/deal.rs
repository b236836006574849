use crate::entities::{DealStatus, deal_entity};
use crate::models::CodeStats;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DealResponse {
    pub id: i32,
    pub salon_id: i32,
    pub title: String,
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
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<deal_entity::Model> for DealResponse {
    fn from(m: deal_entity::Model) -> Self {
        Self {
            id: m.id,
            salon_id: m.salon_id,
            title: m.title,
            description: m.description,
            image_url: m.image_url,
            original_price: m.original_price,
            discounted_price: m.discounted_price,
            is_free: m.is_free,
            category: m.category,
            city: m.city,
            is_active: m.is_active,
            status: m.status,
            featured: m.featured,
            expires_at: m.expires_at,
            quantity_left: m.quantity_left,
            booking_url: m.booking_url,
            requires_discount_code: m.requires_discount_code,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateDealRequest {
    /// Only honoured for admins; salons always create deals on their own salon.
    pub salon_id: Option<i32>,
    #[schema(example = "Klassisk ansiktsbehandling 60 min")]
    pub title: String,
    pub description: String,
    pub image_url: Option<String>,
    #[schema(example = 89900)]
    pub original_price: i64,
    #[schema(example = 49900)]
    pub discounted_price: i64,
    #[serde(default)]
    pub is_free: bool,
    #[schema(example = "Ansiktsbehandling")]
    pub category: String,
    #[schema(example = "Stockholm")]
    pub city: String,
    #[serde(default)]
    pub featured: bool,
    pub expires_at: Option<DateTime<Utc>>,
    #[schema(example = 10)]
    pub quantity: i32,
    pub booking_url: Option<String>,
    #[serde(default = "default_requires_code")]
    pub requires_discount_code: bool,
    pub stripe_price_id: Option<String>,
}

fn default_requires_code() -> bool {
    true
}

/// Partial deal edit. Absent fields are left alone; the nullable ones
/// (`image_url`, `expires_at`, `booking_url`, `stripe_price_id`) are
/// cleared by an explicit `null`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct UpdateDealRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    #[serde(
        default,
        deserialize_with = "nullable",
        skip_serializing_if = "Option::is_none"
    )]
    #[schema(value_type = Option<String>)]
    pub image_url: Option<Option<String>>,
    pub original_price: Option<i64>,
    pub discounted_price: Option<i64>,
    pub is_free: Option<bool>,
    pub category: Option<String>,
    pub city: Option<String>,
    pub is_active: Option<bool>,
    pub featured: Option<bool>,
    #[serde(
        default,
        deserialize_with = "nullable",
        skip_serializing_if = "Option::is_none"
    )]
    #[schema(value_type = Option<String>, format = DateTime)]
    pub expires_at: Option<Option<DateTime<Utc>>>,
    pub quantity_left: Option<i32>,
    #[serde(
        default,
        deserialize_with = "nullable",
        skip_serializing_if = "Option::is_none"
    )]
    #[schema(value_type = Option<String>)]
    pub booking_url: Option<Option<String>>,
    pub requires_discount_code: Option<bool>,
    #[serde(
        default,
        deserialize_with = "nullable",
        skip_serializing_if = "Option::is_none"
    )]
    #[schema(value_type = Option<String>)]
    pub stripe_price_id: Option<Option<String>>,
}

/// `Some(None)` for an explicit `null`; with `#[serde(default)]` an absent
/// field stays `None`.
fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct DealQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub city: Option<String>,
    pub category: Option<String>,
    pub featured: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UpdateDealStatusRequest {
    pub status: DealStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DealStatsResponse {
    pub deal_id: i32,
    pub title: String,
    pub status: DealStatus,
    pub quantity_left: i32,
    pub codes: CodeStats,
    pub purchases: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_request_tells_null_from_absent() {
        let req: UpdateDealRequest = serde_json::from_str(
            r#"{"title":"Ny titel","booking_url":null,"expires_at":"2030-06-01T00:00:00Z"}"#,
        )
        .unwrap();
        assert_eq!(req.title.as_deref(), Some("Ny titel"));
        assert_eq!(req.booking_url, Some(None));
        assert!(matches!(req.expires_at, Some(Some(_))));
        assert_eq!(req.image_url, None);
        assert_eq!(req.stripe_price_id, None);
    }
}
