use actix_web::{HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] sea_orm::DbErr),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Auth error: {0}")]
    AuthError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Sold out: {0}")]
    SoldOut(String),

    #[error("Forbidden")]
    Forbidden,

    #[error("External API error: {0}")]
    ExternalApiError(String),

    #[error("Config error: {0}")]
    ConfigError(String),

    #[error("Internal server error: {0}")]
    InternalError(String),

    #[error("JWT error: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),

    #[error("HTTP request error: {0}")]
    ReqwestError(#[from] reqwest::Error),

    #[error("JSON serialization/deserialization error: {0}")]
    SerdeJsonError(#[from] serde_json::Error),

    #[error("Stripe error: {0}")]
    StripeError(#[from] stripe::StripeError),
}

impl AppError {
    /// Message shown to customers when a deal has nothing left to hand out.
    pub fn sold_out() -> Self {
        AppError::SoldOut("Tyvärr är detta erbjudande slutsålt".to_string())
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::ValidationError(_) => "VALIDATION_ERROR",
            AppError::AuthError(_) | AppError::JwtError(_) => "AUTH_ERROR",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::SoldOut(_) => "SOLD_OUT",
            AppError::Forbidden => "FORBIDDEN",
            AppError::ExternalApiError(_) | AppError::StripeError(_) => "EXTERNAL_API_ERROR",
            AppError::DatabaseError(_) => "DATABASE_ERROR",
            _ => "INTERNAL_ERROR",
        }
    }
}

impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        let (status_code, message) = match self {
            AppError::ValidationError(msg) => {
                log::warn!("Validation error: {msg}");
                (actix_web::http::StatusCode::BAD_REQUEST, msg.clone())
            }
            AppError::AuthError(msg) => {
                log::warn!("Authentication error: {msg}");
                (actix_web::http::StatusCode::UNAUTHORIZED, msg.clone())
            }
            AppError::JwtError(err) => {
                log::warn!("Token rejected: {err}");
                (
                    actix_web::http::StatusCode::UNAUTHORIZED,
                    "Invalid access token".to_string(),
                )
            }
            AppError::NotFound(msg) => (actix_web::http::StatusCode::NOT_FOUND, msg.clone()),
            AppError::SoldOut(msg) => {
                log::info!("Sold out: {msg}");
                (actix_web::http::StatusCode::CONFLICT, msg.clone())
            }
            AppError::Forbidden => {
                log::warn!("Forbidden access");
                (
                    actix_web::http::StatusCode::FORBIDDEN,
                    "Forbidden".to_string(),
                )
            }
            AppError::ExternalApiError(msg) => {
                log::error!("External API error: {msg}");
                (
                    actix_web::http::StatusCode::BAD_GATEWAY,
                    "Payment or email provider unavailable".to_string(),
                )
            }
            AppError::StripeError(err) => {
                log::error!("Stripe error: {err}");
                (
                    actix_web::http::StatusCode::BAD_GATEWAY,
                    "Payment or email provider unavailable".to_string(),
                )
            }
            AppError::DatabaseError(err) => {
                log::error!("Database error: {err}");
                (
                    actix_web::http::StatusCode::INTERNAL_SERVER_ERROR,
                    "Database error".to_string(),
                )
            }
            _ => {
                log::error!("Internal error: {self}");
                (
                    actix_web::http::StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        HttpResponse::build(status_code).json(json!({
            "success": false,
            "error": {
                "code": self.error_code(),
                "message": message
            }
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            AppError::sold_out().error_response().status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::NotFound("Deal not found".into())
                .error_response()
                .status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::Forbidden.error_response().status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            AppError::ValidationError("bad".into())
                .error_response()
                .status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_database_details_are_not_exposed() {
        let err = AppError::DatabaseError(sea_orm::DbErr::Custom(
            "relation \"deals\" does not exist".into(),
        ));
        assert_eq!(err.error_code(), "DATABASE_ERROR");
        assert_eq!(
            err.error_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
