use anyhow::anyhow;
use axum::{extract::State, response::IntoResponse, Json};
use tower_sessions::Session;
use uuid::Uuid;
use validator::Validate;

use crate::{
    app_state::AppState,
    error::{AppError, AppResult},
    models::{matches::PairMatch, sessions::PairSession, websocket::ChatSocketMessage},
    queries::{
        chats::{has_system_message, insert_message},
        matches::{
            find_match_between, get_match, insert_like, insert_match, list_matches_for_pair,
            reverse_like_exists,
        },
        pairs::get_pair,
    },
    utils::venues::{most_popular_venue, venue_recommendation_message},
};

#[derive(serde::Deserialize, Validate)]
pub struct LikePayload {
    #[validate(length(min = 1, message = "Target pair ID cannot be empty"))]
    pub to_pair_id: String,
}

/// Record a like and detect the reciprocal. A fresh match seeds its chat with
/// the venue recommendation; a replayed like changes nothing.
pub async fn like(
    State(state): State<AppState>,
    session: Session,
    Json(mut payload): Json<LikePayload>,
) -> AppResult<impl IntoResponse> {
    payload.to_pair_id = payload.to_pair_id.trim().to_string();
    payload
        .validate()
        .map_err(|e| AppError::BadRequest(anyhow!("Invalid like data: {}", e)))?;

    let pair_session = session
        .get::<PairSession>("pair")
        .await
        .map_err(|_| AppError::Unauthorized(anyhow!("Cannot find pair session")))?;

    let from_pair_id = match pair_session {
        Some(session_data) => session_data.pair_id,
        None => {
            return Err(AppError::Unauthorized(anyhow!("Pair session not found")));
        }
    };

    let to_pair_id = Uuid::parse_str(&payload.to_pair_id)
        .map_err(|_| AppError::BadRequest(anyhow!("Invalid target pair ID format")))?;

    if to_pair_id == from_pair_id {
        return Err(AppError::BadRequest(anyhow!("Cannot like your own pair")));
    }

    let mut conn = state.db_pool.acquire().await.map_err(|e| {
        AppError::InternalServerError(anyhow!("Failed to acquire database connection: {}", e))
    })?;

    if get_pair(&mut conn, to_pair_id).await?.is_none() {
        return Err(AppError::NotFound(anyhow!("Target pair not found")));
    }

    // The like must commit before the reverse-direction check. Inside one
    // transaction, two concurrent reciprocal likes can each run the check
    // before the other side commits and neither would create the match.
    // Committed first, the later check always sees the earlier like, and the
    // canonical unique key collapses a double insert to one row.
    let inserted = insert_like(&mut conn, from_pair_id, to_pair_id).await?;

    let mut created: Option<PairMatch> = None;
    if inserted && reverse_like_exists(&mut conn, from_pair_id, to_pair_id).await? {
        created = insert_match(&mut conn, from_pair_id, to_pair_id).await?;
    }

    let matched = match created {
        Some(new_match) => {
            // Pull both pairs' live sockets into the new room so the match
            // notification and the venue message arrive without a reconnect.
            state
                .chat_sockets
                .join_connected_pair(new_match.id, new_match.pair1_id);
            state
                .chat_sockets
                .join_connected_pair(new_match.id, new_match.pair2_id);

            state
                .chat_sockets
                .broadcast_to_match(
                    new_match.id,
                    ChatSocketMessage::Matched {
                        match_id: new_match.id,
                        pair1_id: new_match.pair1_id,
                        pair2_id: new_match.pair2_id,
                    },
                    None,
                )
                .await;

            recommend_venue(&state, &mut conn, new_match.id).await?;

            Some(new_match)
        }
        // A repeat like on an existing match still reports it to the client
        None => find_match_between(&mut conn, from_pair_id, to_pair_id).await?,
    };

    Ok((
        axum::http::StatusCode::OK,
        Json(serde_json::json!({"liked": true, "match": matched})),
    ))
}

pub async fn get_matches(
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

    let matches = list_matches_for_pair(&mut conn, pair_id).await?;

    Ok((axum::http::StatusCode::OK, Json(matches)))
}

/// Tally both pairs' venue picks and post the winner as the match's one-time
/// system message. Re-running for the same match is a no-op.
async fn recommend_venue(
    state: &AppState,
    conn: &mut sqlx::pool::PoolConnection<sqlx::Postgres>,
    match_id: Uuid,
) -> AppResult<()> {
    if has_system_message(&mut *conn, match_id).await? {
        return Ok(());
    }

    let the_match = get_match(&mut *conn, match_id).await?;

    let pair1 = get_pair(&mut *conn, the_match.pair1_id).await?;
    let pair2 = get_pair(&mut *conn, the_match.pair2_id).await?;
    let (pair1, pair2) = match (pair1, pair2) {
        (Some(p1), Some(p2)) => (p1, p2),
        _ => return Err(AppError::NotFound(anyhow!("Matched pair not found"))),
    };

    let mut lists = pair1.venue_lists();
    lists.extend(pair2.venue_lists());

    let venue = match most_popular_venue(lists) {
        Some(venue) => venue,
        // No preferences submitted: no message
        None => return Ok(()),
    };

    let message_id = Uuid::new_v4();
    let stored = insert_message(
        &mut *conn,
        message_id,
        match_id,
        None,
        &venue_recommendation_message(&venue),
    )
    .await?;

    state
        .chat_sockets
        .broadcast_to_match(
            match_id,
            ChatSocketMessage::Message {
                match_id,
                message_id,
                sender_pair_id: None,
                content: stored.content,
                timestamp: stored.created_at,
            },
            None,
        )
        .await;

    Ok(())
}
