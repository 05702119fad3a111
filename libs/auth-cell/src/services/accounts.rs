use chrono::NaiveDate;
use regex::Regex;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::Method;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, info};

use shared_database::supabase::SupabaseClient;
use shared_utils::jwt::create_token;

use crate::models::{
    AccountError, EntityKind, LoginRequest, LoginResponse, RegisterRequest, RegisteredAccount,
};
use crate::services::password::PasswordService;

/// Seconds a login token stays valid.
pub const TOKEN_TTL_SECONDS: i64 = 3600;

/// Registration and login for both entity kinds. Requests run with the
/// store's anon key only; no caller token exists yet at this boundary.
pub struct AccountService {
    supabase: Arc<SupabaseClient>,
    jwt_secret: String,
}

impl AccountService {
    pub fn new(supabase: Arc<SupabaseClient>, jwt_secret: String) -> Self {
        Self {
            supabase,
            jwt_secret,
        }
    }

    pub async fn register(
        &self,
        kind: EntityKind,
        request: RegisterRequest,
    ) -> Result<RegisteredAccount, AccountError> {
        debug!("Registering new {}", kind);

        validate_registration(kind, &request)?;

        // Pre-checks give clean errors; the store's unique constraints
        // remain the backstop when two registrations race
        let email_matches: Vec<Value> = self
            .supabase
            .request(
                Method::GET,
                &format!(
                    "/rest/v1/{}?email=eq.{}&select=id",
                    kind.table(),
                    request.email
                ),
                None,
                None,
            )
            .await?;
        if !email_matches.is_empty() {
            return Err(AccountError::Duplicate(
                "Email already registered".to_string(),
            ));
        }

        let phone_matches: Vec<Value> = self
            .supabase
            .request(
                Method::GET,
                &format!(
                    "/rest/v1/{}?phone=eq.{}&select=id",
                    kind.table(),
                    request.phone
                ),
                None,
                None,
            )
            .await?;
        if !phone_matches.is_empty() {
            return Err(AccountError::Duplicate(
                "Phone already registered".to_string(),
            ));
        }

        let password_hash = PasswordService::hash_password(&request.password)
            .map_err(|e| AccountError::Password(e.to_string()))?;

        let mut record = serde_json::Map::new();
        record.insert("name".to_string(), json!(request.name));
        record.insert("email".to_string(), json!(request.email));
        record.insert("phone".to_string(), json!(request.phone));
        record.insert("password_hash".to_string(), json!(password_hash));

        match kind {
            EntityKind::Patient => {
                record.insert("date_of_birth".to_string(), json!(request.date_of_birth));
            }
            EntityKind::Doctor => {
                record.insert(
                    "specialization".to_string(),
                    json!(request.specialization),
                );
                record.insert("employee_id".to_string(), json!(self.next_employee_id().await?));
            }
        }

        let mut headers = HeaderMap::new();
        headers.insert("Prefer", HeaderValue::from_static("return=representation"));

        let result: Vec<Value> = self
            .supabase
            .request_with_headers(
                Method::POST,
                &format!("/rest/v1/{}", kind.table()),
                None,
                Some(Value::Object(record)),
                Some(headers),
            )
            .await?;

        if result.is_empty() {
            return Err(AccountError::DatabaseError(
                "Registration returned no row".to_string(),
            ));
        }

        let id = result[0]["id"].as_str().unwrap_or_default().to_string();
        info!("Registered {} {}", kind, id);

        Ok(RegisteredAccount {
            id,
            role: kind.role().to_string(),
            email: request.email,
        })
    }

    pub async fn authenticate(
        &self,
        kind: EntityKind,
        request: LoginRequest,
    ) -> Result<LoginResponse, AccountError> {
        debug!("Authenticating {} by email", kind);

        let rows: Vec<Value> = self
            .supabase
            .request(
                Method::GET,
                &format!(
                    "/rest/v1/{}?email=eq.{}&select=id,password_hash",
                    kind.table(),
                    request.email
                ),
                None,
                None,
            )
            .await?;

        // Unknown email and wrong password must look the same to the caller
        let row = rows.first().ok_or(AccountError::InvalidCredentials)?;

        let stored_hash = row["password_hash"].as_str().ok_or_else(|| {
            AccountError::DatabaseError("Stored credential is unreadable".to_string())
        })?;

        let verified = PasswordService::verify_password(&request.password, stored_hash)
            .map_err(|e| AccountError::Password(e.to_string()))?;
        if !verified {
            return Err(AccountError::InvalidCredentials);
        }

        let subject = row["id"]
            .as_str()
            .ok_or_else(|| AccountError::DatabaseError("Stored id is unreadable".to_string()))?;

        let access_token = create_token(subject, kind.role(), &self.jwt_secret, TOKEN_TTL_SECONDS)
            .map_err(AccountError::Token)?;

        Ok(LoginResponse {
            access_token,
            token_type: "bearer".to_string(),
            expires_in: TOKEN_TTL_SECONDS,
        })
    }

    /// Employee numbers are sequential from 1, one per doctor.
    async fn next_employee_id(&self) -> Result<i64, AccountError> {
        let rows: Vec<Value> = self
            .supabase
            .request(
                Method::GET,
                "/rest/v1/doctors?select=employee_id&order=employee_id.desc&limit=1",
                None,
                None,
            )
            .await?;

        let highest = rows
            .first()
            .and_then(|row| row["employee_id"].as_i64())
            .unwrap_or(0);
        Ok(highest + 1)
    }
}

fn validate_registration(kind: EntityKind, request: &RegisterRequest) -> Result<(), AccountError> {
    let mut errors = Vec::new();

    if request.name.trim().is_empty() {
        errors.push("name must not be empty".to_string());
    }
    if request.phone.trim().is_empty() {
        errors.push("phone must not be empty".to_string());
    }
    if request.password.is_empty() {
        errors.push("password must not be empty".to_string());
    }

    let email_regex = Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").unwrap();
    if !email_regex.is_match(&request.email) {
        errors.push(format!("'{}' is not a valid email address", request.email));
    }

    match kind {
        EntityKind::Patient => match request.date_of_birth.as_deref() {
            Some(dob) if NaiveDate::parse_from_str(dob, "%Y-%m-%d").is_ok() => {}
            Some(dob) => errors.push(format!("'{}' is not a valid YYYY-MM-DD date", dob)),
            None => errors.push("date_of_birth is required for patients".to_string()),
        },
        EntityKind::Doctor => {
            if request
                .specialization
                .as_deref()
                .map_or(true, |s| s.trim().is_empty())
            {
                errors.push("specialization is required for doctors".to_string());
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(AccountError::Validation(errors))
    }
}
