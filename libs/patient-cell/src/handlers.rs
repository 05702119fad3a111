use axum::{
    extract::{Extension, Path, State},
    Json,
};
use axum_extra::TypedHeader;
use headers::{authorization::Bearer, Authorization};
use serde_json::{json, Value};

use shared_models::auth::User;
use shared_models::error::AppError;
use shared_models::PatientId;

use crate::models::{PatientError, UpdatePatientRequest};
use crate::PatientState;

#[axum::debug_handler]
pub async fn get_patient(
    State(state): State<PatientState>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Path(patient_id): Path<PatientId>,
) -> Result<Json<Value>, AppError> {
    // Profiles are owner-scoped
    if user.id != patient_id.to_string() {
        return Err(AppError::Forbidden(
            "You can only access your own profile".to_string(),
        ));
    }

    let patient = state
        .patients
        .get_patient(&patient_id, auth.token())
        .await
        .map_err(map_patient_error)?;

    Ok(Json(json!(patient)))
}

#[axum::debug_handler]
pub async fn update_patient(
    State(state): State<PatientState>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Path(patient_id): Path<PatientId>,
    Json(request): Json<UpdatePatientRequest>,
) -> Result<Json<Value>, AppError> {
    if user.id != patient_id.to_string() {
        return Err(AppError::Forbidden(
            "You can only update your own profile".to_string(),
        ));
    }

    let patient = state
        .patients
        .update_profile(&patient_id, request, auth.token())
        .await
        .map_err(map_patient_error)?;

    Ok(Json(json!(patient)))
}

fn map_patient_error(e: PatientError) -> AppError {
    match e {
        PatientError::NotFound => AppError::NotFound("Patient not found".to_string()),
        PatientError::EmptyUpdate => AppError::BadRequest("No fields to update".to_string()),
        PatientError::DatabaseError(msg) => AppError::Database(msg),
    }
}
