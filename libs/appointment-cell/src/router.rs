// libs/appointment-cell/src/router.rs
use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};

use shared_utils::extractor::auth_middleware;

use crate::handlers;
use crate::AppointmentState;

pub fn appointment_routes(state: AppointmentState) -> Router {
    // Every scheduling operation requires authentication
    let protected_routes = Router::new()
        .route("/book", post(handlers::book_appointment))
        .route("/", get(handlers::list_appointments))
        .route("/{appointment_id}", get(handlers::view_appointment))
        .route("/reschedule/{appointment_id}", put(handlers::reschedule_appointment))
        .route("/cancel/{appointment_id}", delete(handlers::cancel_appointment))
        .layer(middleware::from_fn_with_state(
            state.config.clone(),
            auth_middleware,
        ));

    Router::new().merge(protected_routes).with_state(state)
}
