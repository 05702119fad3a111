pub mod handlers;
pub mod models;
pub mod router;
pub mod services;

pub use models::*;
pub use router::auth_routes;
pub use services::{AccountService, PasswordService, TOKEN_TTL_SECONDS};

use std::sync::Arc;

/// Handles for the auth cell, built once by the composition root.
#[derive(Clone)]
pub struct AuthState {
    pub accounts: Arc<AccountService>,
}
