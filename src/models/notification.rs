use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct NotificationStats {
    /// Delivered since process start.
    pub sent: u64,
    /// Failed delivery attempts since process start (each retry counts).
    pub failed_attempts: u64,
    /// Messages given up on since process start.
    pub dead_letters: u64,
    /// Rows currently waiting in the outbox.
    pub pending: u64,
}
