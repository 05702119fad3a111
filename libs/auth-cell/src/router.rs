use axum::{routing::post, Router};

use crate::handlers;
use crate::AuthState;

pub fn auth_routes(state: AuthState) -> Router {
    // Registration and login are the only unauthenticated routes
    let public_routes = Router::new()
        .route("/{kind}/register", post(handlers::register))
        .route("/{kind}/login", post(handlers::login));

    Router::new().merge(public_routes).with_state(state)
}
