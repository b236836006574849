pub mod account_service;
pub mod checkout_service;
pub mod deal_service;
pub mod discount_code_service;
pub mod notification_service;
pub mod subscription_service;

pub use account_service::*;
pub use checkout_service::*;
pub use deal_service::*;
pub use discount_code_service::*;
pub use notification_service::*;
pub use subscription_service::*;
