use anyhow::anyhow;
use axum::{extract::State, response::IntoResponse, Json};
use chrono::{Duration, Utc};
use sqlx::Acquire;
use validator::Validate;

use crate::{
    app_state::AppState,
    error::{AppError, AppResult},
    queries::verification::{
        consume_verification_code, insert_verification_code, invalidate_codes_for_email,
    },
    utils::{codes, email::send_verification_code_email},
};

const CODE_TTL_MINUTES: i64 = 15;

#[derive(serde::Deserialize, Validate)]
pub struct SendCodePayload {
    #[validate(email(message = "Invalid email format"))]
    #[validate(length(min = 1, max = 255, message = "Email is required and cannot be empty"))]
    pub email: String,
}

pub async fn send_code(
    State(state): State<AppState>,
    Json(mut payload): Json<SendCodePayload>,
) -> AppResult<impl IntoResponse> {
    payload.email = payload.email.trim().to_lowercase();
    payload
        .validate()
        .map_err(|e| AppError::BadRequest(anyhow!("Invalid email: {}", e)))?;

    let code = codes::verification_code();
    let expires_at = Utc::now() + Duration::minutes(CODE_TTL_MINUTES);

    let mut conn = state.db_pool.acquire().await.map_err(|e| {
        AppError::InternalServerError(anyhow!("Failed to acquire database connection: {}", e))
    })?;

    let mut tx = conn.begin().await.map_err(|e| {
        AppError::InternalServerError(anyhow!("Database transaction failed: {}", e))
    })?;

    // Only one code may be live per email
    invalidate_codes_for_email(&mut tx, &payload.email).await?;
    insert_verification_code(&mut tx, &payload.email, &code, expires_at).await?;

    tx.commit().await.map_err(|e| {
        AppError::InternalServerError(anyhow!("Failed to commit transaction: {}", e))
    })?;

    // The code is persisted either way; a failed email is logged and the user
    // can ask for a resend.
    if let Err(e) = send_verification_code_email(&payload.email, &code).await {
        eprintln!(
            "Failed to send verification email to {}: {}",
            payload.email, e
        );
    }

    Ok((
        axum::http::StatusCode::OK,
        Json(serde_json::json!({"sent": true})),
    ))
}

#[derive(serde::Deserialize, Validate)]
pub struct VerifyCodePayload {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[validate(length(min = 1, message = "Code is required"))]
    pub code: String,
}

pub async fn verify_code(
    State(state): State<AppState>,
    Json(mut payload): Json<VerifyCodePayload>,
) -> AppResult<impl IntoResponse> {
    payload.email = payload.email.trim().to_lowercase();
    payload.code = payload.code.trim().to_string();
    payload
        .validate()
        .map_err(|e| AppError::BadRequest(anyhow!("Invalid verification data: {}", e)))?;

    let mut conn = state.db_pool.acquire().await.map_err(|e| {
        AppError::InternalServerError(anyhow!("Failed to acquire database connection: {}", e))
    })?;

    // A single yes/no; never reveal whether the email or the code was wrong
    let verified = consume_verification_code(&mut conn, &payload.email, &payload.code).await?;

    Ok((
        axum::http::StatusCode::OK,
        Json(serde_json::json!({"verified": verified})),
    ))
}
