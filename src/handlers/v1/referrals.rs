use anyhow::anyhow;
use axum::{extract::State, response::IntoResponse, Json};
use chrono::{Duration, Utc};
use tower_sessions::Session;
use validator::Validate;

use crate::{
    app_state::AppState,
    error::{AppError, AppResult},
    models::sessions::PairSession,
    queries::referrals::{
        find_referral_by_code, issue_referral_code, mark_referral_email_sent, NewReferral,
    },
    utils::email::send_partner_invite_email,
};

pub const REFERRAL_TTL_DAYS: i64 = 7;

#[derive(serde::Deserialize, Validate)]
pub struct InvitePartnerPayload {
    /// Partner's address; when present the invite code is emailed to it.
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
}

/// Member-only: issue the single-use code the second crew member redeems to
/// join the pair.
pub async fn invite_partner(
    State(state): State<AppState>,
    session: Session,
    Json(mut payload): Json<InvitePartnerPayload>,
) -> AppResult<impl IntoResponse> {
    if let Some(email) = payload.email.as_mut() {
        *email = email.trim().to_lowercase();
    }
    payload
        .validate()
        .map_err(|e| AppError::BadRequest(anyhow!("Invalid invite data: {}", e)))?;

    let pair_session = session
        .get::<PairSession>("pair")
        .await
        .map_err(|_| AppError::Unauthorized(anyhow!("Cannot find pair session")))?;

    let pair_session = match pair_session {
        Some(session_data) => session_data,
        None => {
            return Err(AppError::Unauthorized(anyhow!("Pair session not found")));
        }
    };

    let mut conn = state.db_pool.acquire().await.map_err(|e| {
        AppError::InternalServerError(anyhow!("Failed to acquire database connection: {}", e))
    })?;

    let referral = issue_referral_code(
        &mut conn,
        NewReferral {
            created_by_email: Some(&pair_session.email),
            email_to: payload.email.as_deref(),
            inviter_pair_id: Some(pair_session.pair_id),
            expires_at: Utc::now() + Duration::days(REFERRAL_TTL_DAYS),
        },
    )
    .await?;

    // Email failure leaves the code valid; the inviter can still share it by hand.
    if let Some(to_email) = payload.email.as_deref() {
        match send_partner_invite_email(to_email, &referral.code).await {
            Ok(()) => mark_referral_email_sent(&mut conn, referral.id).await?,
            Err(e) => eprintln!("Failed to send partner invite to {}: {}", to_email, e),
        }
    }

    Ok((
        axum::http::StatusCode::CREATED,
        Json(serde_json::json!({"code": referral.code, "expires_at": referral.expires_at})),
    ))
}

#[derive(serde::Deserialize, Validate)]
pub struct ValidateCodePayload {
    #[validate(length(min = 1, message = "Code is required"))]
    pub code: String,
}

/// Pre-flight check used by the signup screens. All failure reasons collapse
/// into valid=false; the taxonomy only surfaces on consumption.
pub async fn validate_code(
    State(state): State<AppState>,
    Json(mut payload): Json<ValidateCodePayload>,
) -> AppResult<impl IntoResponse> {
    payload.code = payload.code.trim().to_uppercase();
    payload
        .validate()
        .map_err(|e| AppError::BadRequest(anyhow!("Invalid code data: {}", e)))?;

    let mut conn = state.db_pool.acquire().await.map_err(|e| {
        AppError::InternalServerError(anyhow!("Failed to acquire database connection: {}", e))
    })?;

    let valid = match find_referral_by_code(&mut conn, &payload.code).await? {
        Some(record) => record.usable_at(Utc::now()).is_ok(),
        None => false,
    };

    Ok((
        axum::http::StatusCode::OK,
        Json(serde_json::json!({"valid": valid})),
    ))
}
