// libs/appointment-cell/src/handlers.rs
use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    Json,
};
use axum_extra::TypedHeader;
use headers::{authorization::Bearer, Authorization};
use serde_json::{json, Value};

use shared_models::auth::User;
use shared_models::error::AppError;
use shared_models::{AppointmentId, PatientId};

use crate::models::{
    AppointmentError, AppointmentResponse, BookAppointmentRequest, RescheduleAppointmentRequest,
};
use crate::AppointmentState;

#[axum::debug_handler]
pub async fn book_appointment(
    State(state): State<AppointmentState>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Json(request): Json<BookAppointmentRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let patient_id = require_patient(&user)?;

    let appointment = state
        .booking
        .book_appointment(&patient_id, request, auth.token())
        .await
        .map_err(map_appointment_error)?;

    Ok((
        StatusCode::CREATED,
        Json(json!(AppointmentResponse::from(&appointment))),
    ))
}

#[axum::debug_handler]
pub async fn list_appointments(
    State(state): State<AppointmentState>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    let patient_id = require_patient(&user)?;

    let appointments = state
        .booking
        .list_appointments(&patient_id, auth.token())
        .await
        .map_err(map_appointment_error)?;

    let responses: Vec<AppointmentResponse> =
        appointments.iter().map(AppointmentResponse::from).collect();

    Ok(Json(json!(responses)))
}

#[axum::debug_handler]
pub async fn view_appointment(
    State(state): State<AppointmentState>,
    Path(appointment_id): Path<AppointmentId>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    let patient_id = require_patient(&user)?;

    let appointment = state
        .booking
        .view_appointment(&patient_id, &appointment_id, auth.token())
        .await
        .map_err(map_appointment_error)?;

    Ok(Json(json!(AppointmentResponse::from(&appointment))))
}

#[axum::debug_handler]
pub async fn reschedule_appointment(
    State(state): State<AppointmentState>,
    Path(appointment_id): Path<AppointmentId>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Json(request): Json<RescheduleAppointmentRequest>,
) -> Result<Json<Value>, AppError> {
    let patient_id = require_patient(&user)?;

    let appointment = state
        .booking
        .reschedule_appointment(&patient_id, &appointment_id, request, auth.token())
        .await
        .map_err(map_appointment_error)?;

    Ok(Json(json!(AppointmentResponse::from(&appointment))))
}

#[axum::debug_handler]
pub async fn cancel_appointment(
    State(state): State<AppointmentState>,
    Path(appointment_id): Path<AppointmentId>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    let patient_id = require_patient(&user)?;

    state
        .booking
        .cancel_appointment(&patient_id, &appointment_id, auth.token())
        .await
        .map_err(map_appointment_error)?;

    Ok(Json(json!({ "appointmentId": appointment_id })))
}

/// Every scheduling operation acts on the caller's own patient record.
fn require_patient(user: &User) -> Result<PatientId, AppError> {
    if user.role.as_deref() != Some("patient") {
        return Err(AppError::Forbidden(
            "Only patients can manage appointments".to_string(),
        ));
    }

    user.id
        .parse()
        .map_err(|_| AppError::Auth("Caller id is not a valid patient id".to_string()))
}

fn map_appointment_error(e: AppointmentError) -> AppError {
    match e {
        AppointmentError::NotFound => AppError::NotFound("Appointment not found".to_string()),
        AppointmentError::DoctorNotFound => AppError::NotFound("Doctor not found".to_string()),
        AppointmentError::PatientNotFound => AppError::NotFound("Patient not found".to_string()),
        AppointmentError::Conflict => AppError::Conflict("Appointment already exists".to_string()),
        AppointmentError::Forbidden => AppError::Forbidden(
            "You can only manage your own appointments".to_string(),
        ),
        AppointmentError::Validation(mut errors) => {
            if errors.len() == 1 {
                AppError::ValidationError(errors.remove(0))
            } else {
                AppError::ValidationErrors(errors)
            }
        }
        AppointmentError::DatabaseError(msg) => AppError::Database(msg),
    }
}
