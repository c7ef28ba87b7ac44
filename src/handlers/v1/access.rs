use anyhow::anyhow;
use axum::{
    extract::{Query, State},
    response::IntoResponse,
    Json,
};
use chrono::{Duration, Utc};
use uuid::Uuid;
use validator::Validate;

use crate::{
    app_state::AppState,
    error::{AppError, AppResult},
    models::access::RequestStatus,
    queries::{
        access::{find_request_by_token, insert_access_request, update_request_status},
        referrals::{issue_referral_code, mark_referral_email_sent, NewReferral},
    },
    utils::email::{
        send_access_approved_email, send_access_rejected_email, send_access_request_email,
    },
};

use super::referrals::REFERRAL_TTL_DAYS;

#[derive(serde::Deserialize, Validate)]
pub struct AccessRequestPayload {
    #[validate(email(message = "Invalid email format"))]
    #[validate(length(min = 1, max = 255, message = "Email is required and cannot be empty"))]
    pub email: String,

    #[validate(length(max = 255, message = "University name too long"))]
    pub university: Option<String>,

    #[validate(length(max = 100, message = "Instagram handle too long"))]
    pub instagram: Option<String>,
}

/// Waitlist entry point: stores the request and notifies the support inbox
/// with approve/reject links carrying a one-time token.
pub async fn request_access(
    State(state): State<AppState>,
    Json(mut payload): Json<AccessRequestPayload>,
) -> AppResult<impl IntoResponse> {
    payload.email = payload.email.trim().to_lowercase();
    if let Some(university) = payload.university.as_mut() {
        *university = university.trim().to_string();
    }
    if let Some(instagram) = payload.instagram.as_mut() {
        *instagram = instagram.trim().to_string();
    }

    payload
        .validate()
        .map_err(|e| AppError::BadRequest(anyhow!("Invalid access request data: {}", e)))?;

    let approval_token = Uuid::new_v4();

    let mut conn = state.db_pool.acquire().await.map_err(|e| {
        AppError::InternalServerError(anyhow!("Failed to acquire database connection: {}", e))
    })?;

    insert_access_request(
        &mut conn,
        &payload.email,
        payload.university.as_deref(),
        payload.instagram.as_deref(),
        approval_token,
    )
    .await?;

    // The request row stands even if the notification mail fails; support can
    // still find it in the dashboard.
    if let Err(e) = send_access_request_email(
        &payload.email,
        payload.university.as_deref(),
        payload.instagram.as_deref(),
        approval_token,
    )
    .await
    {
        eprintln!("Failed to send access request notification: {}", e);
    }

    Ok((
        axum::http::StatusCode::CREATED,
        Json(serde_json::json!({"success": true})),
    ))
}

#[derive(serde::Deserialize)]
pub struct RespondParams {
    pub token: Uuid,
    pub approved: bool,
}

/// Link target from the support email. Approval issues a 7-day access code
/// for the requester; either way the request leaves the pending state for
/// good.
pub async fn respond_access(
    State(state): State<AppState>,
    Query(params): Query<RespondParams>,
) -> AppResult<impl IntoResponse> {
    let mut conn = state.db_pool.acquire().await.map_err(|e| {
        AppError::InternalServerError(anyhow!("Failed to acquire database connection: {}", e))
    })?;

    let request = match find_request_by_token(&mut conn, params.token).await? {
        Some(request) => request,
        None => {
            return Err(AppError::NotFound(anyhow!(
                "Invalid or expired approval token"
            )));
        }
    };

    if request.status != RequestStatus::Pending {
        return Err(AppError::Conflict(anyhow!(
            "Request has already been processed"
        )));
    }

    let message = if params.approved {
        let referral = issue_referral_code(
            &mut conn,
            NewReferral {
                created_by_email: None,
                email_to: Some(&request.email),
                inviter_pair_id: None,
                expires_at: Utc::now() + Duration::days(REFERRAL_TTL_DAYS),
            },
        )
        .await?;

        match send_access_approved_email(&request.email, &referral.code).await {
            Ok(()) => mark_referral_email_sent(&mut conn, referral.id).await?,
            // The code stays valid; support can resend it by hand
            Err(e) => eprintln!("Failed to send approval email to {}: {}", request.email, e),
        }

        update_request_status(&mut conn, params.token, RequestStatus::Approved).await?;
        "Access request approved"
    } else {
        if let Err(e) = send_access_rejected_email(&request.email).await {
            eprintln!("Failed to send rejection email to {}: {}", request.email, e);
        }

        update_request_status(&mut conn, params.token, RequestStatus::Rejected).await?;
        "Access request rejected"
    };

    Ok((axum::http::StatusCode::OK, message))
}
