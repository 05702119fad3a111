use axum::{
    extract::{Extension, Path, State},
    Json,
};
use axum_extra::TypedHeader;
use headers::{authorization::Bearer, Authorization};
use serde_json::{json, Value};

use shared_models::auth::User;
use shared_models::error::AppError;
use shared_models::DoctorId;

use crate::models::{DoctorError, SetAvailabilityRequest};
use crate::DoctorState;

/// Publishes the calling doctor's working window.
#[axum::debug_handler]
pub async fn set_availability(
    State(state): State<DoctorState>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Json(request): Json<SetAvailabilityRequest>,
) -> Result<Json<Value>, AppError> {
    // Doctors publish their own window only
    if user.role.as_deref() != Some("doctor") {
        return Err(AppError::Forbidden(
            "Only doctors can set availability".to_string(),
        ));
    }

    let doctor_id: DoctorId = user
        .id
        .parse()
        .map_err(|_| AppError::Auth("Caller id is not a valid doctor id".to_string()))?;

    let availability = state
        .availability
        .set_availability(&doctor_id, request, auth.token())
        .await
        .map_err(map_doctor_error)?;

    Ok(Json(json!(availability)))
}

#[axum::debug_handler]
pub async fn get_availability(
    State(state): State<DoctorState>,
    Path(doctor_id): Path<DoctorId>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
) -> Result<Json<Value>, AppError> {
    let availability = state
        .availability
        .get_availability(&doctor_id, auth.token())
        .await
        .map_err(map_doctor_error)?;

    Ok(Json(json!(availability)))
}

#[axum::debug_handler]
pub async fn get_doctor(
    State(state): State<DoctorState>,
    Path(doctor_id): Path<DoctorId>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
) -> Result<Json<Value>, AppError> {
    let doctor = state
        .doctors
        .get_doctor(&doctor_id, auth.token())
        .await
        .map_err(map_doctor_error)?;

    Ok(Json(json!(doctor)))
}

fn map_doctor_error(e: DoctorError) -> AppError {
    match e {
        DoctorError::NotFound => AppError::NotFound("Doctor not found".to_string()),
        DoctorError::InvalidTime(msg) => AppError::ValidationError(msg),
        DoctorError::InvalidDays(msg) => AppError::ValidationError(msg),
        DoctorError::CacheError(msg) => AppError::Internal(msg),
        DoctorError::DatabaseError(msg) => AppError::Database(msg),
    }
}
