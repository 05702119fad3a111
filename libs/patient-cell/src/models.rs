use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use shared_database::SupabaseError;
use shared_models::PatientId;

/// Column list for patient reads and representation echoes. The password
/// hash stays in the store.
pub const PATIENT_COLUMNS: &str =
    "id,name,email,phone,date_of_birth,address,age,weight,height,blood_group,image";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Patient {
    pub id: PatientId,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub date_of_birth: NaiveDate,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub age: Option<i32>,
    #[serde(default)]
    pub weight: Option<f64>,
    #[serde(default)]
    pub height: Option<f64>,
    #[serde(default)]
    pub blood_group: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
}

/// Partial profile update. Identity fields (name, email, phone, date of
/// birth) are fixed at registration and not updatable here.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdatePatientRequest {
    pub address: Option<String>,
    pub age: Option<i32>,
    pub weight: Option<f64>,
    pub height: Option<f64>,
    pub blood_group: Option<String>,
    pub image: Option<String>,
}

#[derive(Error, Debug)]
pub enum PatientError {
    #[error("Patient not found")]
    NotFound,

    #[error("No fields to update")]
    EmptyUpdate,

    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<SupabaseError> for PatientError {
    fn from(e: SupabaseError) -> Self {
        match e {
            SupabaseError::NotFound(_) => PatientError::NotFound,
            other => PatientError::DatabaseError(other.to_string()),
        }
    }
}
