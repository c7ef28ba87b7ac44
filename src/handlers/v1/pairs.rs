use anyhow::anyhow;
use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use sqlx::Acquire;
use tower_sessions::Session;
use uuid::Uuid;
use validator::Validate;

use crate::{
    app_state::AppState,
    error::{AppError, AppResult},
    models::sessions::PairSession,
    queries::{
        pairs::{complete_pair, get_pair, insert_pair, list_candidates, NewPair},
        referrals::consume_referral_code,
    },
};

#[derive(serde::Deserialize, Validate)]
pub struct SignupPayload {
    #[validate(length(min = 1, message = "Access code is required"))]
    pub access_code: String,

    #[validate(email(message = "Invalid email format"))]
    #[validate(length(min = 1, max = 255, message = "Email is required and cannot be empty"))]
    pub email: String,

    #[validate(length(min = 1, max = 100, message = "City is required"))]
    pub city: String,

    #[validate(length(min = 1, max = 50, message = "Gender is required"))]
    pub gender: String,

    #[validate(length(max = 500, message = "Bio must be 500 characters or fewer"))]
    pub bio: Option<String>,

    pub photo_url: Option<String>,
    pub venues: Option<Vec<String>>,
}

/// First crew member signs up with an admin-issued access code. The code
/// consumption and the pair insert commit together.
pub async fn signup(
    State(state): State<AppState>,
    session: Session,
    Json(mut payload): Json<SignupPayload>,
) -> AppResult<impl IntoResponse> {
    payload.access_code = payload.access_code.trim().to_uppercase();
    payload.email = payload.email.trim().to_lowercase();
    payload.city = payload.city.trim().to_string();
    payload.gender = payload.gender.trim().to_string();
    if let Some(bio) = payload.bio.as_mut() {
        *bio = bio.trim().to_string();
    }

    payload
        .validate()
        .map_err(|e| AppError::BadRequest(anyhow!("Invalid signup data: {}", e)))?;

    let mut conn = state.db_pool.acquire().await.map_err(|e| {
        AppError::InternalServerError(anyhow!("Failed to acquire database connection: {}", e))
    })?;

    let mut tx = conn.begin().await.map_err(|e| {
        AppError::InternalServerError(anyhow!("Database transaction failed: {}", e))
    })?;

    // Single-use gate; NotFound/Expired/AlreadyUsed all read the same to the user
    let referral = consume_referral_code(&mut tx, &payload.access_code, &payload.email)
        .await
        .map_err(collapse_code_error)?;

    // A partner invite completes the inviter's pair; consuming it here would
    // strand that pair with an orphan. The error aborts the transaction, so
    // the code stays unused.
    if referral.is_partner_invite() {
        return Err(AppError::BadRequest(anyhow!(
            "This code is a partner invite; use it on the join screen"
        )));
    }

    let pair_id = Uuid::new_v4();
    let pair = insert_pair(
        &mut tx,
        pair_id,
        NewPair {
            user1_email: &payload.email,
            gender: &payload.gender,
            city: &payload.city,
            bio: payload.bio.as_deref(),
            photo1_url: payload.photo_url.as_deref(),
            venues1: payload.venues.as_deref(),
        },
    )
    .await?;

    tx.commit().await.map_err(|e| {
        AppError::InternalServerError(anyhow!("Failed to commit transaction: {}", e))
    })?;

    let pair_session = PairSession {
        pair_id,
        email: payload.email,
    };
    session
        .insert("pair", pair_session)
        .await
        .map_err(|e| AppError::InternalServerError(anyhow!("Failed to store session: {}", e)))?;

    Ok((axum::http::StatusCode::CREATED, Json(pair)))
}

#[derive(serde::Deserialize, Validate)]
pub struct JoinPayload {
    #[validate(length(min = 1, message = "Invite code is required"))]
    pub code: String,

    #[validate(email(message = "Invalid email format"))]
    #[validate(length(min = 1, max = 255, message = "Email is required and cannot be empty"))]
    pub email: String,

    pub photo_url: Option<String>,
    pub venues: Option<Vec<String>>,
}

/// Second crew member redeems a partner invite. The pair comes from the
/// code's inviter; an already-active pair rejects the join unchanged.
pub async fn join(
    State(state): State<AppState>,
    session: Session,
    Json(mut payload): Json<JoinPayload>,
) -> AppResult<impl IntoResponse> {
    payload.code = payload.code.trim().to_uppercase();
    payload.email = payload.email.trim().to_lowercase();

    payload
        .validate()
        .map_err(|e| AppError::BadRequest(anyhow!("Invalid join data: {}", e)))?;

    let mut conn = state.db_pool.acquire().await.map_err(|e| {
        AppError::InternalServerError(anyhow!("Failed to acquire database connection: {}", e))
    })?;

    let mut tx = conn.begin().await.map_err(|e| {
        AppError::InternalServerError(anyhow!("Database transaction failed: {}", e))
    })?;

    let referral = consume_referral_code(&mut tx, &payload.code, &payload.email)
        .await
        .map_err(collapse_code_error)?;

    let pair_id = match referral.inviter_pair_id {
        Some(id) => id,
        None => {
            // Access codes gate signup, not joining
            return Err(AppError::BadRequest(anyhow!(
                "This code is not a partner invite"
            )));
        }
    };

    let pair = complete_pair(
        &mut tx,
        pair_id,
        &payload.email,
        payload.photo_url.as_deref(),
        payload.venues.as_deref(),
    )
    .await?;

    tx.commit().await.map_err(|e| {
        AppError::InternalServerError(anyhow!("Failed to commit transaction: {}", e))
    })?;

    let pair_session = PairSession {
        pair_id,
        email: payload.email,
    };
    session
        .insert("pair", pair_session)
        .await
        .map_err(|e| AppError::InternalServerError(anyhow!("Failed to store session: {}", e)))?;

    Ok((axum::http::StatusCode::OK, Json(pair)))
}

pub async fn get_pair_by_id(
    State(state): State<AppState>,
    session: Session,
    Path(pair_id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let pair_session = session
        .get::<PairSession>("pair")
        .await
        .map_err(|_| AppError::Unauthorized(anyhow!("Cannot find pair session")))?;

    if pair_session.is_none() {
        return Err(AppError::Unauthorized(anyhow!("Pair session not found")));
    }

    let pair_id = pair_id
        .parse::<Uuid>()
        .map_err(|_| AppError::BadRequest(anyhow!("Invalid pair ID format")))?;

    let mut conn = state.db_pool.acquire().await.map_err(|e| {
        AppError::InternalServerError(anyhow!("Failed to acquire database connection: {}", e))
    })?;

    match get_pair(&mut conn, pair_id).await? {
        Some(pair) => Ok((axum::http::StatusCode::OK, Json(pair))),
        None => Err(AppError::NotFound(anyhow!("Pair not found"))),
    }
}

/// Swipe deck for the session pair: same city, other gender tag, nothing
/// already liked.
pub async fn candidates(
    State(state): State<AppState>,
    session: Session,
) -> AppResult<impl IntoResponse> {
    let pair_session = session
        .get::<PairSession>("pair")
        .await
        .map_err(|_| AppError::Unauthorized(anyhow!("Cannot find pair session")))?;

    let pair_id = match pair_session {
        Some(session_data) => session_data.pair_id,
        None => {
            return Err(AppError::Unauthorized(anyhow!("Pair session not found")));
        }
    };

    let mut conn = state.db_pool.acquire().await.map_err(|e| {
        AppError::InternalServerError(anyhow!("Failed to acquire database connection: {}", e))
    })?;

    let pair = match get_pair(&mut conn, pair_id).await? {
        Some(pair) => pair,
        None => return Err(AppError::NotFound(anyhow!("Pair not found"))),
    };

    let found = list_candidates(&mut conn, pair.id, &pair.city, &pair.gender).await?;

    Ok((axum::http::StatusCode::OK, Json(found)))
}

/// Every code redemption failure reads the same to the user.
fn collapse_code_error(err: AppError) -> AppError {
    match err {
        AppError::NotFound(_) | AppError::Gone(_) | AppError::Conflict(_) => {
            AppError::BadRequest(anyhow!("Invalid or expired code"))
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signup_payload() -> SignupPayload {
        SignupPayload {
            access_code: "AB12CD".to_string(),
            email: "amelia@example.com".to_string(),
            city: "Chicago".to_string(),
            gender: "women".to_string(),
            bio: Some("Two friends who love live music".to_string()),
            photo_url: None,
            venues: Some(vec!["Kingston Mines".to_string()]),
        }
    }

    #[test]
    fn well_formed_signup_passes_validation() {
        assert!(signup_payload().validate().is_ok());
    }

    #[test]
    fn empty_access_code_is_rejected() {
        let mut payload = signup_payload();
        payload.access_code = String::new();
        assert!(payload.validate().is_err());
    }

    #[test]
    fn malformed_email_is_rejected() {
        let mut payload = signup_payload();
        payload.email = "not-an-email".to_string();
        assert!(payload.validate().is_err());
    }

    #[test]
    fn overlong_bio_is_rejected() {
        let mut payload = signup_payload();
        payload.bio = Some("x".repeat(501));
        assert!(payload.validate().is_err());
    }

    #[test]
    fn join_payload_requires_a_code_and_a_valid_email() {
        let payload = JoinPayload {
            code: "AB12CD".to_string(),
            email: "friend@example.com".to_string(),
            photo_url: None,
            venues: None,
        };
        assert!(payload.validate().is_ok());

        let empty_code = JoinPayload {
            code: String::new(),
            ..payload
        };
        assert!(empty_code.validate().is_err());
    }
}
