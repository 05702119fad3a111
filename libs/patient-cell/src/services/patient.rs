use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::Method;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::debug;

use shared_database::supabase::SupabaseClient;
use shared_models::PatientId;

use crate::models::{Patient, PatientError, UpdatePatientRequest, PATIENT_COLUMNS};

pub struct PatientService {
    supabase: Arc<SupabaseClient>,
}

impl PatientService {
    pub fn new(supabase: Arc<SupabaseClient>) -> Self {
        Self { supabase }
    }

    pub async fn get_patient(
        &self,
        patient_id: &PatientId,
        auth_token: &str,
    ) -> Result<Patient, PatientError> {
        debug!("Fetching patient profile {}", patient_id);

        let result: Vec<Value> = self
            .supabase
            .request(
                Method::GET,
                &format!(
                    "/rest/v1/patients?id=eq.{}&select={}",
                    patient_id, PATIENT_COLUMNS
                ),
                Some(auth_token),
                None,
            )
            .await?;

        if result.is_empty() {
            return Err(PatientError::NotFound);
        }

        serde_json::from_value(result[0].clone())
            .map_err(|e| PatientError::DatabaseError(e.to_string()))
    }

    /// Applies the provided profile fields. A request with no fields set is
    /// rejected rather than forwarded as an empty PATCH.
    pub async fn update_profile(
        &self,
        patient_id: &PatientId,
        request: UpdatePatientRequest,
        auth_token: &str,
    ) -> Result<Patient, PatientError> {
        debug!("Updating patient profile {}", patient_id);

        let mut update_data = serde_json::Map::new();

        if let Some(address) = request.address {
            update_data.insert("address".to_string(), json!(address));
        }
        if let Some(age) = request.age {
            update_data.insert("age".to_string(), json!(age));
        }
        if let Some(weight) = request.weight {
            update_data.insert("weight".to_string(), json!(weight));
        }
        if let Some(height) = request.height {
            update_data.insert("height".to_string(), json!(height));
        }
        if let Some(blood_group) = request.blood_group {
            update_data.insert("blood_group".to_string(), json!(blood_group));
        }
        if let Some(image) = request.image {
            update_data.insert("image".to_string(), json!(image));
        }

        if update_data.is_empty() {
            return Err(PatientError::EmptyUpdate);
        }

        let mut headers = HeaderMap::new();
        headers.insert("Prefer", HeaderValue::from_static("return=representation"));

        let result: Vec<Value> = self
            .supabase
            .request_with_headers(
                Method::PATCH,
                &format!(
                    "/rest/v1/patients?id=eq.{}&select={}",
                    patient_id, PATIENT_COLUMNS
                ),
                Some(auth_token),
                Some(Value::Object(update_data)),
                Some(headers),
            )
            .await?;

        if result.is_empty() {
            return Err(PatientError::NotFound);
        }

        serde_json::from_value(result[0].clone())
            .map_err(|e| PatientError::DatabaseError(e.to_string()))
    }
}
