use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use shared_utils::extractor::auth_middleware;

use crate::handlers;
use crate::DoctorState;

pub fn doctor_routes(state: DoctorState) -> Router {
    // Every doctor endpoint requires a valid bearer token
    let protected_routes = Router::new()
        .route("/availability", post(handlers::set_availability))
        .route("/availability/{doctor_id}", get(handlers::get_availability))
        .route("/{doctor_id}", get(handlers::get_doctor))
        .layer(middleware::from_fn_with_state(
            state.config.clone(),
            auth_middleware,
        ));

    Router::new().merge(protected_routes).with_state(state)
}
