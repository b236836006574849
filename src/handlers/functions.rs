//! Root-level function endpoints called directly by the storefront and the
//! admin dashboard.

use crate::handlers::current_user;
use crate::models::*;
use crate::services::{AccountService, CheckoutService, SubscriptionService};
use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    post,
    path = "/checkout-deal",
    tag = "checkout",
    request_body = CheckoutDealRequest,
    responses(
        (status = 200, description = "`{free: true, code}` for free deals, `{url}` otherwise", body = CheckoutResponse),
        (status = 400, description = "Invalid customer details"),
        (status = 404, description = "Deal not found"),
        (status = 409, description = "Sold out")
    )
)]
pub async fn checkout_deal(
    checkout_service: web::Data<CheckoutService>,
    request: web::Json<CheckoutDealRequest>,
) -> Result<HttpResponse> {
    match checkout_service.checkout_deal(request.into_inner()).await {
        Ok(response) => Ok(HttpResponse::Ok().json(response)),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/create-checkout-session",
    tag = "checkout",
    request_body = CreateCheckoutSessionRequest,
    responses(
        (status = 200, description = "`{url}` of the hosted checkout page", body = CheckoutResponse),
        (status = 404, description = "Deal not found"),
        (status = 409, description = "Sold out")
    )
)]
pub async fn create_checkout_session(
    checkout_service: web::Data<CheckoutService>,
    request: web::Json<CreateCheckoutSessionRequest>,
) -> Result<HttpResponse> {
    match checkout_service
        .create_checkout_session(request.into_inner())
        .await
    {
        Ok(response) => Ok(HttpResponse::Ok().json(response)),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/cancel-subscription",
    tag = "subscriptions",
    request_body = CancelSubscriptionRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Subscription ends at period end", body = CancelSubscriptionResponse),
        (status = 403, description = "Not the salon owner"),
        (status = 404, description = "Subscription not found"),
        (status = 502, description = "Payment provider unavailable")
    )
)]
pub async fn cancel_subscription(
    subscription_service: web::Data<SubscriptionService>,
    req: HttpRequest,
    request: web::Json<CancelSubscriptionRequest>,
) -> Result<HttpResponse> {
    let user = match current_user(&req) {
        Ok(user) => user,
        Err(e) => return Ok(e.error_response()),
    };

    match subscription_service
        .cancel_subscription(&user, request.into_inner())
        .await
    {
        Ok(response) => Ok(HttpResponse::Ok().json(response)),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/update-salon-subscription",
    tag = "subscriptions",
    request_body = UpdateSalonSubscriptionRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Plan updated", body = SalonResponse),
        (status = 403, description = "Admins only"),
        (status = 404, description = "Salon not found")
    )
)]
pub async fn update_salon_subscription(
    subscription_service: web::Data<SubscriptionService>,
    req: HttpRequest,
    request: web::Json<UpdateSalonSubscriptionRequest>,
) -> Result<HttpResponse> {
    let user = match current_user(&req) {
        Ok(user) => user,
        Err(e) => return Ok(e.error_response()),
    };

    match subscription_service
        .update_salon_subscription(&user, request.into_inner())
        .await
    {
        Ok(salon) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": salon
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/create-admin-account",
    tag = "accounts",
    request_body = CreateAdminAccountRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Admin account created", body = CreateAccountResponse),
        (status = 400, description = "Invalid or taken email"),
        (status = 403, description = "Admins only")
    )
)]
pub async fn create_admin_account(
    account_service: web::Data<AccountService>,
    req: HttpRequest,
    request: web::Json<CreateAdminAccountRequest>,
) -> Result<HttpResponse> {
    let user = match current_user(&req) {
        Ok(user) => user,
        Err(e) => return Ok(e.error_response()),
    };

    match account_service
        .create_admin_account(&user, request.into_inner())
        .await
    {
        Ok(account) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": account
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/create-salon-account",
    tag = "accounts",
    request_body = CreateSalonAccountRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Salon account and salon created", body = CreateAccountResponse),
        (status = 400, description = "Invalid or taken email"),
        (status = 403, description = "Admins only")
    )
)]
pub async fn create_salon_account(
    account_service: web::Data<AccountService>,
    req: HttpRequest,
    request: web::Json<CreateSalonAccountRequest>,
) -> Result<HttpResponse> {
    let user = match current_user(&req) {
        Ok(user) => user,
        Err(e) => return Ok(e.error_response()),
    };

    match account_service
        .create_salon_account(&user, request.into_inner())
        .await
    {
        Ok(account) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": account
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/create-admin",
    tag = "accounts",
    request_body = CreateAdminRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Account promoted to admin", body = CreateAccountResponse),
        (status = 403, description = "Admins only"),
        (status = 404, description = "User not found")
    )
)]
pub async fn create_admin(
    account_service: web::Data<AccountService>,
    req: HttpRequest,
    request: web::Json<CreateAdminRequest>,
) -> Result<HttpResponse> {
    let user = match current_user(&req) {
        Ok(user) => user,
        Err(e) => return Ok(e.error_response()),
    };

    match account_service.create_admin(&user, request.into_inner()).await {
        Ok(account) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": account
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/delete-user",
    tag = "accounts",
    request_body = DeleteUserRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "User and owned data deleted", body = DeleteUserResponse),
        (status = 403, description = "Admins only"),
        (status = 404, description = "User not found")
    )
)]
pub async fn delete_user(
    account_service: web::Data<AccountService>,
    req: HttpRequest,
    request: web::Json<DeleteUserRequest>,
) -> Result<HttpResponse> {
    let user = match current_user(&req) {
        Ok(user) => user,
        Err(e) => return Ok(e.error_response()),
    };

    match account_service.delete_user(&user, request.into_inner()).await {
        Ok(deleted) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": deleted
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn functions_config(cfg: &mut web::ServiceConfig) {
    cfg.route("/checkout-deal", web::post().to(checkout_deal))
        .route("/create-checkout-session", web::post().to(create_checkout_session))
        .route("/cancel-subscription", web::post().to(cancel_subscription))
        .route("/update-salon-subscription", web::post().to(update_salon_subscription))
        .route("/create-admin-account", web::post().to(create_admin_account))
        .route("/create-salon-account", web::post().to(create_salon_account))
        .route("/create-admin", web::post().to(create_admin))
        .route("/delete-user", web::post().to(delete_user));
}
