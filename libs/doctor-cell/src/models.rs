use serde::{Deserialize, Serialize};
use thiserror::Error;

use shared_database::SupabaseError;
use shared_models::DoctorId;

// ==============================================================================
// REQUESTS
// ==============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct SetAvailabilityRequest {
    pub availability_start: String,
    pub availability_end: String,
    pub days_available: Vec<String>,
}

// ==============================================================================
// STORE ROWS AND RESPONSES
// ==============================================================================

/// Doctor row as persisted. `days_available` is stored comma-joined and
/// split back out at the API boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DoctorRecord {
    pub id: DoctorId,
    pub employee_id: i64,
    pub name: String,
    pub specialization: String,
    pub email: String,
    pub phone: String,
    #[serde(default)]
    pub availability_start: Option<String>,
    #[serde(default)]
    pub availability_end: Option<String>,
    #[serde(default)]
    pub days_available: Option<String>,
}

impl DoctorRecord {
    pub fn availability(&self) -> DoctorAvailability {
        DoctorAvailability {
            doctor_id: self.id,
            availability_start: self.availability_start.clone(),
            availability_end: self.availability_end.clone(),
            days_available: split_days(self.days_available.as_deref()),
        }
    }

    pub fn into_profile(self) -> DoctorProfile {
        let days_available = split_days(self.days_available.as_deref());
        DoctorProfile {
            id: self.id,
            employee_id: self.employee_id,
            name: self.name,
            specialization: self.specialization,
            email: self.email,
            phone: self.phone,
            availability_start: self.availability_start,
            availability_end: self.availability_end,
            days_available,
        }
    }
}

/// Working window as exposed over the API. All fields except the id are
/// null until the doctor has published a window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DoctorAvailability {
    pub doctor_id: DoctorId,
    pub availability_start: Option<String>,
    pub availability_end: Option<String>,
    pub days_available: Vec<String>,
}

/// Doctor profile as returned to callers. Credential material never
/// appears here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DoctorProfile {
    pub id: DoctorId,
    pub employee_id: i64,
    pub name: String,
    pub specialization: String,
    pub email: String,
    pub phone: String,
    pub availability_start: Option<String>,
    pub availability_end: Option<String>,
    pub days_available: Vec<String>,
}

fn split_days(joined: Option<&str>) -> Vec<String> {
    joined
        .unwrap_or_default()
        .split(',')
        .filter(|day| !day.is_empty())
        .map(|day| day.to_string())
        .collect()
}

// ==============================================================================
// ERRORS
// ==============================================================================

#[derive(Error, Debug)]
pub enum DoctorError {
    #[error("Doctor not found")]
    NotFound,

    #[error("{0}")]
    InvalidTime(String),

    #[error("{0}")]
    InvalidDays(String),

    #[error("Cache error: {0}")]
    CacheError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<SupabaseError> for DoctorError {
    fn from(e: SupabaseError) -> Self {
        match e {
            SupabaseError::NotFound(_) => DoctorError::NotFound,
            other => DoctorError::DatabaseError(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(days: Option<&str>) -> DoctorRecord {
        DoctorRecord {
            id: DoctorId::new(),
            employee_id: 7,
            name: "Test Doctor".to_string(),
            specialization: "Cardiology".to_string(),
            email: "doctor@example.com".to_string(),
            phone: "+353851234567".to_string(),
            availability_start: Some("09:00".to_string()),
            availability_end: Some("17:00".to_string()),
            days_available: days.map(|d| d.to_string()),
        }
    }

    #[test]
    fn test_availability_splits_joined_days() {
        let availability = record(Some("monday,wednesday,friday")).availability();
        assert_eq!(
            availability.days_available,
            vec!["monday", "wednesday", "friday"]
        );
    }

    #[test]
    fn test_availability_with_no_days_is_empty() {
        let availability = record(None).availability();
        assert!(availability.days_available.is_empty());
        assert_eq!(availability.availability_start.as_deref(), Some("09:00"));
    }

    #[test]
    fn test_profile_keeps_employee_number() {
        let profile = record(Some("tuesday")).into_profile();
        assert_eq!(profile.employee_id, 7);
        assert_eq!(profile.days_available, vec!["tuesday"]);
    }
}
