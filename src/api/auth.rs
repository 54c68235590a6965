//! Auth endpoint handlers.
//!
//! Handlers validate payloads, call into the auth service, and map domain
//! errors to status codes. No auth semantics live here.

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use std::sync::Arc;

use super::error::ApiError;
use super::validation;
use crate::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub login_id: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LogoutRequest {
    pub token: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestCodeRequest {
    pub login_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyCodeRequest {
    pub login_id: String,
    pub code: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    pub login_id: String,
    pub new_password: String,
}

/// Extract the bearer token from request headers
fn extract_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
}

/// POST /auth/login
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(request): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validation::validate_login_id(&request.login_id)
        .map_err(|e| ApiError::validation_field("loginId", e))?;

    let session = state.auth.login(&request.login_id, &request.password).await?;
    Ok(Json(session))
}

/// POST /auth/logout
pub async fn logout(
    State(state): State<Arc<AppState>>,
    Json(request): Json<LogoutRequest>,
) -> StatusCode {
    state.auth.logout(&request.token);
    StatusCode::NO_CONTENT
}

/// GET /auth/session
pub async fn session(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    let token =
        extract_token(&headers).ok_or_else(|| ApiError::unauthorized("Missing bearer token"))?;

    match state.auth.get_session(token) {
        Some(session) => Ok(Json(session)),
        None => Err(ApiError::unauthorized("Session missing or expired")),
    }
}

/// POST /auth/request-code
pub async fn request_code(
    State(state): State<Arc<AppState>>,
    Json(request): Json<RequestCodeRequest>,
) -> Result<StatusCode, ApiError> {
    validation::validate_login_id(&request.login_id)
        .map_err(|e| ApiError::validation_field("loginId", e))?;

    // Delivering the code (email/SMS) is the mailer's job, not this core's.
    state.auth.request_reset_code(&request.login_id).await?;
    Ok(StatusCode::ACCEPTED)
}

/// POST /auth/verify-code
pub async fn verify_code(
    State(state): State<Arc<AppState>>,
    Json(request): Json<VerifyCodeRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validation::validate_login_id(&request.login_id)
        .map_err(|e| ApiError::validation_field("loginId", e))?;
    validation::validate_reset_code(&request.code)
        .map_err(|e| ApiError::validation_field("code", e))?;

    let outcome = state
        .auth
        .verify_reset_code(&request.login_id, &request.code)
        .await?;
    Ok(Json(outcome))
}

/// POST /auth/reset-password
pub async fn reset_password(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ResetPasswordRequest>,
) -> Result<StatusCode, ApiError> {
    validation::validate_login_id(&request.login_id)
        .map_err(|e| ApiError::validation_field("loginId", e))?;
    validation::validate_new_password(&request.new_password)
        .map_err(|e| ApiError::validation_field("newPassword", e))?;

    state
        .auth
        .reset_password(&request.login_id, &request.new_password)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
