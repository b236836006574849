use crate::handlers::current_user;
use crate::models::*;
use crate::services::DealService;
use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    get,
    path = "/api/v1/salon/deals",
    tag = "salon",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Deals of the caller's salon", body = [DealResponse]),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "No salon for this account")
    )
)]
pub async fn salon_deals(
    deal_service: web::Data<DealService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    let user = match current_user(&req) {
        Ok(user) => user,
        Err(e) => return Ok(e.error_response()),
    };

    match deal_service.list_salon_deals(&user).await {
        Ok(deals) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": deals
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/salon/stats",
    tag = "salon",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Code and purchase counts per deal", body = [DealStatsResponse]),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "No salon for this account")
    )
)]
pub async fn salon_stats(
    deal_service: web::Data<DealService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    let user = match current_user(&req) {
        Ok(user) => user,
        Err(e) => return Ok(e.error_response()),
    };

    match deal_service.salon_stats(&user).await {
        Ok(stats) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": stats
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn salon_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/salon")
            .route("/deals", web::get().to(salon_deals))
            .route("/stats", web::get().to(salon_stats)),
    );
}
