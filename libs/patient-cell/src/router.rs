use axum::{
    middleware,
    routing::{get, patch},
    Router,
};
use shared_utils::extractor::auth_middleware;

use crate::handlers::*;
use crate::PatientState;

pub fn create_patient_router(state: PatientState) -> Router {
    Router::new()
        .route("/{patient_id}", get(get_patient))
        .route("/{patient_id}", patch(update_patient))
        .layer(middleware::from_fn_with_state(
            state.config.clone(),
            auth_middleware,
        ))
        .with_state(state)
}
