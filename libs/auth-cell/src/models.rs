use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use shared_database::SupabaseError;

/// Entity kind addressed by the generic register/login routes. One service
/// handles both kinds; the tag picks the table and the issued role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Patient,
    Doctor,
}

impl EntityKind {
    pub fn table(&self) -> &'static str {
        match self {
            EntityKind::Patient => "patients",
            EntityKind::Doctor => "doctors",
        }
    }

    pub fn role(&self) -> &'static str {
        match self {
            EntityKind::Patient => "patient",
            EntityKind::Doctor => "doctor",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.role())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub password: String,
    /// Required for patients, `%Y-%m-%d`.
    pub date_of_birth: Option<String>,
    /// Required for doctors.
    pub specialization: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegisteredAccount {
    pub id: String,
    pub role: String,
    pub email: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

#[derive(Error, Debug)]
pub enum AccountError {
    #[error("Validation failed")]
    Validation(Vec<String>),

    #[error("{0}")]
    Duplicate(String),

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Credential hashing failed: {0}")]
    Password(String),

    #[error("Token issuance failed: {0}")]
    Token(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<SupabaseError> for AccountError {
    fn from(e: SupabaseError) -> Self {
        match e {
            // Unique-constraint backstop when two registrations race
            SupabaseError::Conflict(_) => {
                AccountError::Duplicate("Email or phone already registered".to_string())
            }
            other => AccountError::DatabaseError(other.to_string()),
        }
    }
}
