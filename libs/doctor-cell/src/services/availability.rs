use chrono::NaiveTime;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::Method;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, warn};

use shared_database::supabase::SupabaseClient;
use shared_models::DoctorId;

use crate::models::{DoctorAvailability, DoctorError, DoctorRecord, SetAvailabilityRequest};
use crate::services::cache::AvailabilityCache;

/// Accepted weekday tokens, canonical order. Full names are stored;
/// three-letter abbreviations are accepted on input.
const WEEKDAYS: [(&str, &str); 7] = [
    ("monday", "mon"),
    ("tuesday", "tue"),
    ("wednesday", "wed"),
    ("thursday", "thu"),
    ("friday", "fri"),
    ("saturday", "sat"),
    ("sunday", "sun"),
];

pub struct AvailabilityService {
    supabase: Arc<SupabaseClient>,
    cache: AvailabilityCache,
}

impl AvailabilityService {
    pub fn new(supabase: Arc<SupabaseClient>, cache: AvailabilityCache) -> Self {
        Self { supabase, cache }
    }

    /// Replaces the doctor's published window. Cached snapshots for the
    /// doctor are dropped before the new window is reported back.
    pub async fn set_availability(
        &self,
        doctor_id: &DoctorId,
        request: SetAvailabilityRequest,
        auth_token: &str,
    ) -> Result<DoctorAvailability, DoctorError> {
        debug!("Setting availability for doctor {}", doctor_id);

        let start = parse_wall_clock(&request.availability_start)?;
        let end = parse_wall_clock(&request.availability_end)?;

        if start >= end {
            return Err(DoctorError::InvalidTime(
                "availability_start must be before availability_end".to_string(),
            ));
        }

        let days = canonical_days(&request.days_available)?;

        let update_data = json!({
            "availability_start": start.format("%H:%M").to_string(),
            "availability_end": end.format("%H:%M").to_string(),
            "days_available": days.join(","),
        });

        let mut headers = HeaderMap::new();
        headers.insert("Prefer", HeaderValue::from_static("return=representation"));

        let result: Vec<Value> = self
            .supabase
            .request_with_headers(
                Method::PATCH,
                &format!("/rest/v1/doctors?id=eq.{}", doctor_id),
                Some(auth_token),
                Some(update_data),
                Some(headers),
            )
            .await?;

        if result.is_empty() {
            return Err(DoctorError::NotFound);
        }

        let record: DoctorRecord = serde_json::from_value(result[0].clone())
            .map_err(|e| DoctorError::DatabaseError(e.to_string()))?;

        // Stale snapshots must be gone before the write reports success
        self.cache
            .invalidate_doctor(doctor_id)
            .await
            .map_err(|e| DoctorError::CacheError(e.to_string()))?;

        Ok(record.availability())
    }

    /// Returns the doctor's window, from cache when a fresh snapshot
    /// exists. A doctor that has not published one yet gets null fields,
    /// not an error.
    pub async fn get_availability(
        &self,
        doctor_id: &DoctorId,
        auth_token: &str,
    ) -> Result<DoctorAvailability, DoctorError> {
        let cache_key = AvailabilityCache::doctor_availability_key(doctor_id);

        if let Some(cached) = self.cache.get_json(&cache_key).await {
            match serde_json::from_value(cached) {
                Ok(availability) => return Ok(availability),
                Err(e) => warn!("Ignoring malformed cache entry {}: {}", cache_key, e),
            }
        }

        let record = self.fetch_doctor(doctor_id, auth_token).await?;
        let availability = record.availability();

        if let Ok(value) = serde_json::to_value(&availability) {
            self.cache.put_json(&cache_key, &value).await;
        }

        Ok(availability)
    }

    async fn fetch_doctor(
        &self,
        doctor_id: &DoctorId,
        auth_token: &str,
    ) -> Result<DoctorRecord, DoctorError> {
        let result: Vec<Value> = self
            .supabase
            .request(
                Method::GET,
                &format!(
                    "/rest/v1/doctors?id=eq.{}&select=id,employee_id,name,specialization,email,phone,availability_start,availability_end,days_available",
                    doctor_id
                ),
                Some(auth_token),
                None,
            )
            .await?;

        if result.is_empty() {
            return Err(DoctorError::NotFound);
        }

        serde_json::from_value(result[0].clone())
            .map_err(|e| DoctorError::DatabaseError(e.to_string()))
    }
}

fn parse_wall_clock(value: &str) -> Result<NaiveTime, DoctorError> {
    NaiveTime::parse_from_str(value, "%H:%M")
        .map_err(|_| DoctorError::InvalidTime(format!("'{}' is not a valid HH:MM time", value)))
}

/// Canonicalizes weekday tokens to lowercase full names in Monday-first
/// order, collapsing duplicates.
fn canonical_days(days: &[String]) -> Result<Vec<String>, DoctorError> {
    if days.is_empty() {
        return Err(DoctorError::InvalidDays(
            "days_available must not be empty".to_string(),
        ));
    }

    let mut selected = [false; 7];
    for token in days {
        let normalized = token.trim().to_lowercase();
        let index = WEEKDAYS
            .iter()
            .position(|(full, short)| normalized == *full || normalized == *short)
            .ok_or_else(|| {
                DoctorError::InvalidDays(format!("'{}' is not a weekday", token))
            })?;
        selected[index] = true;
    }

    Ok(WEEKDAYS
        .iter()
        .zip(selected)
        .filter(|(_, picked)| *picked)
        .map(|((full, _), _)| (*full).to_string())
        .collect())
}
