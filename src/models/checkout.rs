use crate::models::CustomerInfo;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutDealRequest {
    pub deal_id: i32,
    pub customer_info: CustomerInfo,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCheckoutSessionRequest {
    pub deal_id: i32,
}

/// Either `{free: true, code}` or `{url}`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct CheckoutResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub free: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl CheckoutResponse {
    pub fn free_code(code: String) -> Self {
        Self {
            free: Some(true),
            code: Some(code),
            url: None,
        }
    }

    pub fn redirect(url: String) -> Self {
        Self {
            free: None,
            code: None,
            url: Some(url),
        }
    }
}

/// Paid checkout completed at the payment provider, extracted from the
/// `checkout.session.completed` webhook payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletedCheckout {
    pub session_id: String,
    pub deal_id: i32,
    pub customer: CustomerInfo,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checkout_request_uses_camel_case() {
        let body = r#"{"dealId":7,"customerInfo":{"name":"A","email":"a@x.com","phone":"0701234567"}}"#;
        let req: CheckoutDealRequest = serde_json::from_str(body).unwrap();
        assert_eq!(req.deal_id, 7);
        assert_eq!(req.customer_info.email, "a@x.com");
    }

    #[test]
    fn test_response_shapes() {
        let free = serde_json::to_value(CheckoutResponse::free_code("ABCD2345".into())).unwrap();
        assert_eq!(free, serde_json::json!({"free": true, "code": "ABCD2345"}));

        let paid = serde_json::to_value(CheckoutResponse::redirect("https://pay".into())).unwrap();
        assert_eq!(paid, serde_json::json!({"url": "https://pay"}));
    }
}
