use crate::handlers::current_user;
use crate::models::*;
use crate::services::{DealService, DiscountCodeService};
use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    get,
    path = "/api/v1/deals",
    tag = "deals",
    params(
        ("page" = Option<u32>, Query, description = "Page number, from 1"),
        ("per_page" = Option<u32>, Query, description = "Page size, max 100"),
        ("city" = Option<String>, Query, description = "Only deals in this city"),
        ("category" = Option<String>, Query, description = "Only deals in this category"),
        ("featured" = Option<bool>, Query, description = "Only featured or non-featured deals")
    ),
    responses(
        (status = 200, description = "Approved, active deals", body = [DealResponse])
    )
)]
pub async fn list_deals(
    deal_service: web::Data<DealService>,
    query: web::Query<DealQuery>,
) -> Result<HttpResponse> {
    match deal_service.list_public(&query).await {
        Ok(page) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": page
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/deals/{id}",
    tag = "deals",
    params(
        ("id" = i32, Path, description = "Deal id")
    ),
    responses(
        (status = 200, description = "Deal", body = DealResponse),
        (status = 404, description = "Deal not found")
    )
)]
pub async fn get_deal(
    deal_service: web::Data<DealService>,
    path: web::Path<i32>,
) -> Result<HttpResponse> {
    match deal_service.get_deal(path.into_inner()).await {
        Ok(deal) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": deal
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/api/v1/deals",
    tag = "deals",
    request_body = CreateDealRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Deal created", body = DealResponse),
        (status = 400, description = "Invalid deal"),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn create_deal(
    deal_service: web::Data<DealService>,
    req: HttpRequest,
    request: web::Json<CreateDealRequest>,
) -> Result<HttpResponse> {
    let user = match current_user(&req) {
        Ok(user) => user,
        Err(e) => return Ok(e.error_response()),
    };

    match deal_service.create_deal(&user, request.into_inner()).await {
        Ok(deal) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": deal
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/api/v1/deals/{id}",
    tag = "deals",
    request_body = UpdateDealRequest,
    params(
        ("id" = i32, Path, description = "Deal id")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Deal updated", body = DealResponse),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Deal not found")
    )
)]
pub async fn update_deal(
    deal_service: web::Data<DealService>,
    req: HttpRequest,
    path: web::Path<i32>,
    request: web::Json<UpdateDealRequest>,
) -> Result<HttpResponse> {
    let user = match current_user(&req) {
        Ok(user) => user,
        Err(e) => return Ok(e.error_response()),
    };

    match deal_service
        .update_deal(&user, path.into_inner(), request.into_inner())
        .await
    {
        Ok(deal) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": deal
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    delete,
    path = "/api/v1/deals/{id}",
    tag = "deals",
    params(
        ("id" = i32, Path, description = "Deal id")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Deal and its codes deleted"),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Deal not found")
    )
)]
pub async fn delete_deal(
    deal_service: web::Data<DealService>,
    req: HttpRequest,
    path: web::Path<i32>,
) -> Result<HttpResponse> {
    let user = match current_user(&req) {
        Ok(user) => user,
        Err(e) => return Ok(e.error_response()),
    };

    match deal_service.delete_deal(&user, path.into_inner()).await {
        Ok(()) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "message": "Deal deleted"
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/api/v1/deals/{id}/status",
    tag = "deals",
    request_body = UpdateDealStatusRequest,
    params(
        ("id" = i32, Path, description = "Deal id")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Status changed", body = DealResponse),
        (status = 403, description = "Admins only"),
        (status = 404, description = "Deal not found")
    )
)]
pub async fn update_status(
    deal_service: web::Data<DealService>,
    req: HttpRequest,
    path: web::Path<i32>,
    request: web::Json<UpdateDealStatusRequest>,
) -> Result<HttpResponse> {
    let user = match current_user(&req) {
        Ok(user) => user,
        Err(e) => return Ok(e.error_response()),
    };

    match deal_service
        .set_status(&user, path.into_inner(), request.status)
        .await
    {
        Ok(deal) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": deal
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/deals/{id}/codes",
    tag = "deals",
    params(
        ("id" = i32, Path, description = "Deal id")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Codes of the deal", body = [DiscountCodeResponse]),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Deal not found")
    )
)]
pub async fn list_codes(
    deal_service: web::Data<DealService>,
    discount_code_service: web::Data<DiscountCodeService>,
    req: HttpRequest,
    path: web::Path<i32>,
) -> Result<HttpResponse> {
    let user = match current_user(&req) {
        Ok(user) => user,
        Err(e) => return Ok(e.error_response()),
    };
    let deal_id = path.into_inner();
    if let Err(e) = deal_service.authorize(&user, deal_id).await {
        return Ok(e.error_response());
    }

    match discount_code_service.list_codes(deal_id).await {
        Ok(codes) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": codes
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/api/v1/deals/{id}/codes",
    tag = "deals",
    request_body = IssueCodesRequest,
    params(
        ("id" = i32, Path, description = "Deal id")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Codes issued", body = IssueCodesResponse),
        (status = 400, description = "Quantity out of range"),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Deal not found")
    )
)]
pub async fn issue_codes(
    deal_service: web::Data<DealService>,
    discount_code_service: web::Data<DiscountCodeService>,
    req: HttpRequest,
    path: web::Path<i32>,
    request: Option<web::Json<IssueCodesRequest>>,
) -> Result<HttpResponse> {
    let user = match current_user(&req) {
        Ok(user) => user,
        Err(e) => return Ok(e.error_response()),
    };
    let deal_id = path.into_inner();
    if let Err(e) = deal_service.authorize(&user, deal_id).await {
        return Ok(e.error_response());
    }
    let quantity = request
        .and_then(|r| r.quantity)
        .unwrap_or_else(|| discount_code_service.default_batch());

    match discount_code_service.issue_codes(deal_id, quantity).await {
        Ok(codes) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": IssueCodesResponse {
                deal_id,
                issued: codes.len(),
                codes,
            }
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn deals_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/deals")
            .route("", web::get().to(list_deals))
            .route("", web::post().to(create_deal))
            .route("/{id}", web::get().to(get_deal))
            .route("/{id}", web::put().to(update_deal))
            .route("/{id}", web::delete().to(delete_deal))
            .route("/{id}/status", web::put().to(update_status))
            .route("/{id}/codes", web::get().to(list_codes))
            .route("/{id}/codes", web::post().to(issue_codes)),
    );
}
