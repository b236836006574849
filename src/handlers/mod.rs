pub mod admin;
pub mod auth;
pub mod deals;
pub mod functions;
pub mod salon;
pub mod webhook;

pub use admin::admin_config;
pub use auth::auth_config;
pub use deals::deals_config;
pub use functions::functions_config;
pub use salon::salon_config;
pub use webhook::webhook_config;

use crate::error::{AppError, AppResult};
use crate::models::AuthUser;
use actix_web::{HttpMessage, HttpRequest};

/// Caller placed in the request by `AuthMiddleware`.
pub fn current_user(req: &HttpRequest) -> AppResult<AuthUser> {
    req.extensions()
        .get::<AuthUser>()
        .copied()
        .ok_or_else(|| AppError::AuthError("Missing access token".to_string()))
}
