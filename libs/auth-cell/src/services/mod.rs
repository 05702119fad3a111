pub mod accounts;
pub mod password;

pub use accounts::{AccountService, TOKEN_TTL_SECONDS};
pub use password::PasswordService;
