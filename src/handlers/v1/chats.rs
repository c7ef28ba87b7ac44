use anyhow::anyhow;
use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use tower_sessions::Session;
use uuid::Uuid;
use validator::Validate;

use crate::{
    app_state::AppState,
    error::{AppError, AppResult},
    models::{sessions::PairSession, websocket::ChatSocketMessage},
    queries::chats::{insert_message, list_messages, pair_in_match},
};

pub async fn get_messages(
    State(state): State<AppState>,
    session: Session,
    Path(match_id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let pair_id = session_pair_id(&session).await?;

    let match_id = match_id
        .parse::<Uuid>()
        .map_err(|_| AppError::BadRequest(anyhow!("Invalid match ID format")))?;

    let mut conn = state.db_pool.acquire().await.map_err(|e| {
        AppError::InternalServerError(anyhow!("Failed to acquire database connection: {}", e))
    })?;

    if !pair_in_match(&mut conn, match_id, pair_id).await? {
        return Err(AppError::Forbidden(anyhow!(
            "You are not part of this match"
        )));
    }

    let messages = list_messages(&mut conn, match_id).await?;

    Ok((axum::http::StatusCode::OK, Json(messages)))
}

#[derive(serde::Deserialize, Validate)]
pub struct SendMessagePayload {
    #[validate(length(min = 1, max = 2000, message = "Message cannot be empty"))]
    pub content: String,
}

pub async fn send_message(
    State(state): State<AppState>,
    session: Session,
    Path(match_id): Path<String>,
    Json(mut payload): Json<SendMessagePayload>,
) -> AppResult<impl IntoResponse> {
    payload.content = payload.content.trim().to_string();
    payload
        .validate()
        .map_err(|e| AppError::BadRequest(anyhow!("Invalid message: {}", e)))?;

    let pair_id = session_pair_id(&session).await?;

    let match_id = match_id
        .parse::<Uuid>()
        .map_err(|_| AppError::BadRequest(anyhow!("Invalid match ID format")))?;

    let mut conn = state.db_pool.acquire().await.map_err(|e| {
        AppError::InternalServerError(anyhow!("Failed to acquire database connection: {}", e))
    })?;

    if !pair_in_match(&mut conn, match_id, pair_id).await? {
        return Err(AppError::Forbidden(anyhow!(
            "You are not part of this match"
        )));
    }

    let message_id = Uuid::new_v4();
    let stored = insert_message(&mut conn, message_id, match_id, Some(pair_id), &payload.content)
        .await?;

    // Best-effort live delivery; clients dedupe by message id against the
    // initial fetch.
    state
        .chat_sockets
        .broadcast_to_match(
            match_id,
            ChatSocketMessage::Message {
                match_id,
                message_id,
                sender_pair_id: Some(pair_id),
                content: stored.content.clone(),
                timestamp: stored.created_at,
            },
            None,
        )
        .await;

    Ok((axum::http::StatusCode::CREATED, Json(stored)))
}

async fn session_pair_id(session: &Session) -> AppResult<Uuid> {
    let pair_session = session
        .get::<PairSession>("pair")
        .await
        .map_err(|_| AppError::Unauthorized(anyhow!("Cannot find pair session")))?;

    match pair_session {
        Some(session_data) => Ok(session_data.pair_id),
        None => Err(AppError::Unauthorized(anyhow!("Pair session not found"))),
    }
}
