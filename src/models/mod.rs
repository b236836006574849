pub mod account;
pub mod checkout;
pub mod common;
pub mod deal;
pub mod discount_code;
pub mod notification;
pub mod pagination;
pub mod salon;

pub use account::*;
pub use checkout::*;
pub use common::*;
pub use deal::*;
pub use discount_code::*;
pub use notification::*;
pub use pagination::*;
pub use salon::*;
