pub mod email;
pub mod stripe;

pub use email::*;
pub use stripe::*;
