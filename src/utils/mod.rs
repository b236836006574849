pub mod code_generator;
pub mod jwt;
pub mod password;
pub mod retry;
pub mod validation;

pub use code_generator::{CodeAlphabet, generate_code, generate_code_batch};
pub use jwt::*;
pub use password::*;
pub use retry::{CancelHandle, CancelToken, RetryError, RetryPolicy, retry_with_backoff};
pub use validation::*;
