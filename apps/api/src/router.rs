use axum::{routing::get, Router};

use appointment_cell::{appointment_routes, AppointmentState};
use auth_cell::{auth_routes, AuthState};
use doctor_cell::{doctor_routes, DoctorState};
use patient_cell::{create_patient_router, PatientState};

pub fn create_router(
    auth: AuthState,
    appointments: AppointmentState,
    doctors: DoctorState,
    patients: PatientState,
) -> Router {
    Router::new()
        .route("/", get(|| async { "CareLoop Clinic API is running!" }))
        .nest("/auth", auth_routes(auth))
        .nest("/appointments", appointment_routes(appointments))
        .nest("/doctors", doctor_routes(doctors))
        .nest("/patients", create_patient_router(patients))
}
