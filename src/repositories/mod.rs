//! Typed data access per entity.
//!
//! Services never build ad hoc filters against the entities themselves; every
//! query they need has a name here. All functions are generic over
//! `ConnectionTrait` so they run unchanged on the pool or inside a
//! transaction.

pub mod deal_repository;
pub mod discount_code_repository;
pub mod purchase_repository;
pub mod salon_repository;
pub mod user_repository;

pub use deal_repository::DealRepository;
pub use discount_code_repository::DiscountCodeRepository;
pub use purchase_repository::PurchaseRepository;
pub use salon_repository::SalonRepository;
pub use user_repository::UserRepository;

use sea_orm::{DbErr, SqlErr};

/// True when `err` came from a unique index rejecting the write.
pub fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}
