use actix_web::web;
use utoipa::OpenApi;
use utoipa::{
    Modify,
    openapi::security::{Http, HttpAuthScheme, SecurityScheme},
};
use utoipa_swagger_ui::SwaggerUi;

use crate::entities::{DealStatus, SubscriptionPlan, UserRole};
use crate::handlers;
use crate::models::*;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
            )
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::functions::checkout_deal,
        handlers::functions::create_checkout_session,
        handlers::functions::cancel_subscription,
        handlers::functions::update_salon_subscription,
        handlers::functions::create_admin_account,
        handlers::functions::create_salon_account,
        handlers::functions::create_admin,
        handlers::functions::delete_user,
        handlers::auth::login,
        handlers::deals::list_deals,
        handlers::deals::get_deal,
        handlers::deals::create_deal,
        handlers::deals::update_deal,
        handlers::deals::delete_deal,
        handlers::deals::update_status,
        handlers::deals::list_codes,
        handlers::deals::issue_codes,
        handlers::salon::salon_deals,
        handlers::salon::salon_stats,
        handlers::admin::notification_stats,
    ),
    components(
        schemas(
            CheckoutDealRequest,
            CreateCheckoutSessionRequest,
            CheckoutResponse,
            CustomerInfo,
            DealResponse,
            CreateDealRequest,
            UpdateDealRequest,
            UpdateDealStatusRequest,
            DealStatsResponse,
            DealStatus,
            DiscountCodeResponse,
            IssueCodesRequest,
            IssueCodesResponse,
            CodeStats,
            LoginRequest,
            AuthResponse,
            UserResponse,
            UserRole,
            CreateAdminAccountRequest,
            CreateSalonAccountRequest,
            CreateAdminRequest,
            CreateAccountResponse,
            DeleteUserRequest,
            DeleteUserResponse,
            SalonResponse,
            SubscriptionPlan,
            CancelSubscriptionRequest,
            CancelSubscriptionResponse,
            UpdateSalonSubscriptionRequest,
            NotificationStats,
            ApiError,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "checkout", description = "Securing deals"),
        (name = "deals", description = "Deal listings and discount codes"),
        (name = "salon", description = "Salon dashboard"),
        (name = "accounts", description = "Account administration"),
        (name = "subscriptions", description = "Salon subscriptions"),
        (name = "auth", description = "Authentication"),
        (name = "admin", description = "Operations"),
    ),
    info(
        title = "Lyxdeal Backend API",
        version = "1.0.0",
        description = "Deals marketplace for beauty salons"
    )
)]
pub struct ApiDoc;

pub fn swagger_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
    )
    .route(
        "/swagger-ui",
        web::get().to(|| async {
            actix_web::HttpResponse::Found()
                .append_header(("Location", "/swagger-ui/"))
                .finish()
        }),
    );
}
