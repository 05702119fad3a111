// libs/appointment-cell/src/models.rs
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use shared_database::SupabaseError;
use shared_models::{AppointmentId, DoctorId, PatientId};

// ==============================================================================
// CORE APPOINTMENT MODELS
// ==============================================================================

/// Appointment row as persisted. Times are naive clinic-local wall clock;
/// no timezone conversion happens anywhere in the workspace.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    pub id: AppointmentId,
    pub patient_id: PatientId,
    pub doctor_id: DoctorId,
    pub date: NaiveDate,
    #[serde(with = "hhmm_time")]
    pub time: NaiveTime,
    pub status: AppointmentStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppointmentStatus {
    Booked,
    Cancelled,
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppointmentStatus::Booked => write!(f, "booked"),
            AppointmentStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Appointment as exposed over the API; field names are part of the
/// public contract.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentResponse {
    pub appointment_id: AppointmentId,
    pub patient_id: PatientId,
    pub doctor_id: DoctorId,
    pub date: String,
    pub time: String,
    pub status: AppointmentStatus,
}

impl From<&Appointment> for AppointmentResponse {
    fn from(appointment: &Appointment) -> Self {
        Self {
            appointment_id: appointment.id,
            patient_id: appointment.patient_id,
            doctor_id: appointment.doctor_id,
            date: appointment.date.format("%Y-%m-%d").to_string(),
            time: appointment.time.format("%H:%M").to_string(),
            status: appointment.status,
        }
    }
}

// ==============================================================================
// REQUESTS
// ==============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct BookAppointmentRequest {
    pub doctor_id: DoctorId,
    pub date: String,
    pub time: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RescheduleAppointmentRequest {
    pub date: String,
    pub time: String,
}

// ==============================================================================
// ERRORS
// ==============================================================================

#[derive(Error, Debug)]
pub enum AppointmentError {
    #[error("Appointment not found")]
    NotFound,

    #[error("Doctor not found")]
    DoctorNotFound,

    #[error("Patient not found")]
    PatientNotFound,

    #[error("Appointment already exists")]
    Conflict,

    #[error("You can only manage your own appointments")]
    Forbidden,

    #[error("Validation failed")]
    Validation(Vec<String>),

    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<SupabaseError> for AppointmentError {
    fn from(e: SupabaseError) -> Self {
        match e {
            // The store's uniqueness constraint decides racing writes
            SupabaseError::Conflict(_) => AppointmentError::Conflict,
            SupabaseError::NotFound(_) => AppointmentError::NotFound,
            other => AppointmentError::DatabaseError(other.to_string()),
        }
    }
}

/// Store time columns round-trip as "HH:MM:SS"; the public contract uses
/// "HH:MM". Accept both, emit "HH:MM".
mod hhmm_time {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&time.format("%H:%M").to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        NaiveTime::parse_from_str(&raw, "%H:%M:%S")
            .or_else(|_| NaiveTime::parse_from_str(&raw, "%H:%M"))
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_appointment_parses_store_times() {
        let row = json!({
            "id": AppointmentId::new(),
            "patient_id": PatientId::new(),
            "doctor_id": DoctorId::new(),
            "date": "2025-04-05",
            "time": "14:30:00",
            "status": "booked",
            "created_at": "2025-04-01T09:00:00Z"
        });

        let appointment: Appointment = serde_json::from_value(row).unwrap();
        assert_eq!(appointment.date, NaiveDate::from_ymd_opt(2025, 4, 5).unwrap());
        assert_eq!(appointment.time, NaiveTime::from_hms_opt(14, 30, 0).unwrap());
        assert_eq!(appointment.status, AppointmentStatus::Booked);
    }

    #[test]
    fn test_response_uses_public_field_names() {
        let appointment = Appointment {
            id: AppointmentId::new(),
            patient_id: PatientId::new(),
            doctor_id: DoctorId::new(),
            date: NaiveDate::from_ymd_opt(2025, 4, 5).unwrap(),
            time: NaiveTime::from_hms_opt(14, 30, 0).unwrap(),
            status: AppointmentStatus::Booked,
            created_at: Utc::now(),
        };

        let encoded = serde_json::to_value(AppointmentResponse::from(&appointment)).unwrap();
        assert_eq!(encoded["appointmentId"], json!(appointment.id.to_string()));
        assert_eq!(encoded["patientId"], json!(appointment.patient_id.to_string()));
        assert_eq!(encoded["doctorId"], json!(appointment.doctor_id.to_string()));
        assert_eq!(encoded["date"], json!("2025-04-05"));
        assert_eq!(encoded["time"], json!("14:30"));
        assert_eq!(encoded["status"], json!("booked"));
        assert!(encoded.get("createdAt").is_none());
    }

    #[test]
    fn test_status_survives_round_trip() {
        let status: AppointmentStatus = serde_json::from_str("\"cancelled\"").unwrap();
        assert_eq!(status, AppointmentStatus::Cancelled);
        assert_eq!(serde_json::to_string(&status).unwrap(), "\"cancelled\"");
    }
}
