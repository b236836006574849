use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Body of every error response, see `AppError::error_response`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiError {
    pub code: String,
    pub message: String,
}
