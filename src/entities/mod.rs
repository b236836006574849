pub mod deals;
pub mod discount_codes;
pub mod email_outbox;
pub mod purchases;
pub mod salons;
pub mod users;

pub use deals::DealStatus;
pub use email_outbox::EmailStatus;
pub use salons::SubscriptionPlan;
pub use users::UserRole;

pub use deals as deal_entity;
pub use discount_codes as discount_code_entity;
pub use email_outbox as email_outbox_entity;
pub use purchases as purchase_entity;
pub use salons as salon_entity;
pub use users as user_entity;
