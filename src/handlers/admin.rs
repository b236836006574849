use crate::error::AppError;
use crate::handlers::current_user;
use crate::models::*;
use crate::services::NotificationService;
use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    get,
    path = "/api/v1/admin/notifications/stats",
    tag = "admin",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Email outbox counters", body = NotificationStats),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admins only")
    )
)]
pub async fn notification_stats(
    notification_service: web::Data<NotificationService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    let user = match current_user(&req) {
        Ok(user) if user.is_admin() => user,
        Ok(_) => return Ok(AppError::Forbidden.error_response()),
        Err(e) => return Ok(e.error_response()),
    };
    log::debug!("Notification stats requested by {}", user.user_id);

    match notification_service.stats().await {
        Ok(stats) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": stats
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn admin_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/admin").route("/notifications/stats", web::get().to(notification_stats)),
    );
}
