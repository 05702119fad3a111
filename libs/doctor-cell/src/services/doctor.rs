use reqwest::Method;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

use shared_database::supabase::SupabaseClient;
use shared_models::DoctorId;

use crate::models::{DoctorError, DoctorProfile, DoctorRecord};
use crate::services::cache::AvailabilityCache;

pub struct DoctorService {
    supabase: Arc<SupabaseClient>,
    cache: AvailabilityCache,
}

impl DoctorService {
    pub fn new(supabase: Arc<SupabaseClient>, cache: AvailabilityCache) -> Self {
        Self { supabase, cache }
    }

    /// Fetches a doctor's profile, from cache when possible. The column
    /// list keeps credential material out of the response.
    pub async fn get_doctor(
        &self,
        doctor_id: &DoctorId,
        auth_token: &str,
    ) -> Result<DoctorProfile, DoctorError> {
        let cache_key = AvailabilityCache::doctor_details_key(doctor_id);

        if let Some(cached) = self.cache.get_json(&cache_key).await {
            match serde_json::from_value(cached) {
                Ok(profile) => return Ok(profile),
                Err(e) => warn!("Ignoring malformed cache entry {}: {}", cache_key, e),
            }
        }

        debug!("Fetching doctor {}", doctor_id);

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

        let record: DoctorRecord = serde_json::from_value(result[0].clone())
            .map_err(|e| DoctorError::DatabaseError(e.to_string()))?;
        let profile = record.into_profile();

        if let Ok(value) = serde_json::to_value(&profile) {
            self.cache.put_json(&cache_key, &value).await;
        }

        Ok(profile)
    }
}
