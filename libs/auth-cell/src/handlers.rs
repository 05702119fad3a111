use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};

use shared_models::error::AppError;

use crate::models::{AccountError, EntityKind, LoginRequest, LoginResponse, RegisterRequest};
use crate::AuthState;

#[axum::debug_handler]
pub async fn register(
    State(state): State<AuthState>,
    Path(kind): Path<EntityKind>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let account = state
        .accounts
        .register(kind, request)
        .await
        .map_err(map_account_error)?;

    Ok((StatusCode::CREATED, Json(json!(account))))
}

#[axum::debug_handler]
pub async fn login(
    State(state): State<AuthState>,
    Path(kind): Path<EntityKind>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let response = state
        .accounts
        .authenticate(kind, request)
        .await
        .map_err(map_account_error)?;

    Ok(Json(response))
}

fn map_account_error(e: AccountError) -> AppError {
    match e {
        AccountError::Validation(mut errors) => {
            if errors.len() == 1 {
                AppError::ValidationError(errors.remove(0))
            } else {
                AppError::ValidationErrors(errors)
            }
        }
        AccountError::Duplicate(msg) => AppError::Conflict(msg),
        AccountError::InvalidCredentials => {
            AppError::Auth("Invalid email or password".to_string())
        }
        AccountError::Password(msg) | AccountError::Token(msg) => AppError::Internal(msg),
        AccountError::DatabaseError(msg) => AppError::Database(msg),
    }
}
