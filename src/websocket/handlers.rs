use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use tower_sessions::Session;
use uuid::Uuid;

use crate::{
    app_state::AppState,
    error::{AppError, AppResult},
    models::{
        sessions::PairSession,
        websocket::{ChatSocketMessage, IncomingMessage},
    },
    queries::{
        chats::{insert_message, mark_message_as_read, pair_in_match},
        matches::match_ids_for_pair,
    },
};

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    session: Session,
) -> AppResult<Response> {
    let pair_session = session
        .get::<PairSession>("pair")
        .await
        .map_err(|_| AppError::Unauthorized(anyhow::anyhow!("Cannot find pair session")))?;

    let pair_id = match pair_session {
        Some(session_data) => session_data.pair_id,
        None => {
            return Err(AppError::Unauthorized(anyhow::anyhow!(
                "Pair session not found"
            )));
        }
    };

    Ok(ws.on_upgrade(move |socket| handle_websocket(socket, state, pair_id)))
}

async fn handle_websocket(socket: WebSocket, state: AppState, pair_id: Uuid) {
    let (mut sender, mut receiver) = socket.split();
    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel::<ChatSocketMessage>();

    // Spawn task to handle outgoing messages
    let outgoing_task = tokio::spawn(async move {
        while let Some(message) = rx.recv().await {
            if let Ok(json) = serde_json::to_string(&message) {
                if sender.send(Message::Text(json.into())).await.is_err() {
                    break;
                }
            }
        }
    });

    let mut conn = match state.db_pool.acquire().await {
        Ok(conn) => conn,
        Err(_) => {
            eprintln!("Failed to acquire database connection");
            return;
        }
    };

    // Reachable even before it has any rooms; matches created mid-session
    // pull the pair in through this registration.
    state.chat_sockets.register_pair(pair_id, tx.clone());

    // Join the rooms of every match this pair belongs to
    match match_ids_for_pair(&mut conn, pair_id).await {
        Ok(match_ids) => {
            for match_id in match_ids {
                state.chat_sockets.join_room(match_id, pair_id, tx.clone());
            }
        }
        Err(e) => {
            eprintln!("Failed to get matches for pair {}: {}", pair_id, e);
            return;
        }
    }

    // Handle incoming messages
    while let Some(msg) = receiver.next().await {
        match msg {
            Ok(Message::Text(text)) => {
                if let Err(e) = handle_text_message(&state, pair_id, text.to_string()).await {
                    eprintln!("Error handling text message from pair {}: {}", pair_id, e);
                }
            }
            Ok(Message::Close(_)) => {
                break;
            }
            Err(e) => {
                eprintln!("Error receiving message from pair {}: {}", pair_id, e);
                break;
            }
            _ => {}
        }
    }

    // cleanup when connection closes
    state.chat_sockets.leave_all_rooms(pair_id);
    outgoing_task.abort();
}

async fn handle_text_message(state: &AppState, pair_id: Uuid, text: String) -> AppResult<()> {
    let parsed: serde_json::Value = serde_json::from_str(&text)
        .map_err(|_| AppError::BadRequest(anyhow::anyhow!("Invalid JSON")))?;

    let message_type = parsed["type"].as_str().ok_or_else(|| {
        AppError::BadRequest(anyhow::anyhow!(
            "Missing or invalid 'type' field in message"
        ))
    })?;

    match message_type {
        "send_message" => {
            let incoming: IncomingMessage = serde_json::from_value(parsed)
                .map_err(|_| AppError::BadRequest(anyhow::anyhow!("Invalid message format")))?;
            handle_send_message(state, pair_id, incoming).await?;
        }
        "typing" => {
            handle_typing_indicator(state, pair_id, parsed).await?;
        }
        "mark_read" => {
            handle_mark_read(state, pair_id, parsed).await?;
        }
        "ping" => {
            let pong = ChatSocketMessage::Pong;
            state.chat_sockets.send_to_pair(pair_id, pong).await;
        }
        _ => {
            let error = ChatSocketMessage::Error {
                message: format!("Unknown message type: {}", message_type),
            };
            state.chat_sockets.send_to_pair(pair_id, error).await;
        }
    }

    Ok(())
}

async fn handle_send_message(
    state: &AppState,
    pair_id: Uuid,
    incoming: IncomingMessage,
) -> AppResult<()> {
    let mut conn = state.db_pool.acquire().await.map_err(|_| {
        AppError::InternalServerError(anyhow::anyhow!("Database connection failed"))
    })?;

    // Verify the pair belongs to the match
    if !pair_in_match(&mut conn, incoming.match_id, pair_id).await? {
        return Err(AppError::Forbidden(anyhow::anyhow!("Pair not in match")));
    }

    // Same bounds the HTTP send path enforces through payload validation
    let content = normalized_content(&incoming.content).ok_or_else(|| {
        AppError::BadRequest(anyhow::anyhow!(
            "Message must be between 1 and 2000 characters"
        ))
    })?;

    let message_id = Uuid::new_v4();
    let stored = insert_message(&mut conn, message_id, incoming.match_id, Some(pair_id), content)
        .await?;

    let ws_message = ChatSocketMessage::Message {
        match_id: incoming.match_id,
        message_id,
        sender_pair_id: Some(pair_id),
        content: stored.content,
        timestamp: stored.created_at,
    };

    state
        .chat_sockets
        .broadcast_to_match(incoming.match_id, ws_message, None)
        .await;

    Ok(())
}

async fn handle_typing_indicator(
    state: &AppState,
    pair_id: Uuid,
    parsed: serde_json::Value,
) -> AppResult<()> {
    let match_id = Uuid::parse_str(
        parsed["match_id"]
            .as_str()
            .ok_or_else(|| AppError::BadRequest(anyhow::anyhow!("Missing match_id")))?,
    )
    .map_err(|_| AppError::BadRequest(anyhow::anyhow!("Invalid match_id")))?;

    let is_typing = parsed["is_typing"]
        .as_bool()
        .ok_or_else(|| AppError::BadRequest(anyhow::anyhow!("Missing is_typing")))?;

    let typing_message = ChatSocketMessage::Typing {
        match_id,
        pair_id,
        is_typing,
    };

    state
        .chat_sockets
        .broadcast_to_match(match_id, typing_message, Some(pair_id))
        .await;

    Ok(())
}

async fn handle_mark_read(
    state: &AppState,
    pair_id: Uuid,
    parsed: serde_json::Value,
) -> AppResult<()> {
    let message_id = Uuid::parse_str(
        parsed["message_id"]
            .as_str()
            .ok_or_else(|| AppError::BadRequest(anyhow::anyhow!("Missing message_id")))?,
    )
    .map_err(|_| AppError::BadRequest(anyhow::anyhow!("Invalid message_id")))?;

    let match_id = Uuid::parse_str(
        parsed["match_id"]
            .as_str()
            .ok_or_else(|| AppError::BadRequest(anyhow::anyhow!("Missing match_id")))?,
    )
    .map_err(|_| AppError::BadRequest(anyhow::anyhow!("Invalid match_id")))?;

    let mut conn = state.db_pool.acquire().await.map_err(|_| {
        AppError::InternalServerError(anyhow::anyhow!("Database connection failed"))
    })?;

    if !pair_in_match(&mut conn, match_id, pair_id).await? {
        return Err(AppError::Forbidden(anyhow::anyhow!("Pair not in match")));
    }

    mark_message_as_read(&mut conn, message_id, match_id).await?;

    let read_message = ChatSocketMessage::MessageRead {
        match_id,
        message_id,
        pair_id,
    };

    state
        .chat_sockets
        .broadcast_to_match(match_id, read_message, Some(pair_id))
        .await;

    Ok(())
}

fn normalized_content(raw: &str) -> Option<&str> {
    let content = raw.trim();
    if content.is_empty() || content.len() > 2000 {
        return None;
    }
    Some(content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_content_is_trimmed() {
        assert_eq!(normalized_content("  hi there  "), Some("hi there"));
    }

    #[test]
    fn blank_message_content_is_rejected() {
        assert_eq!(normalized_content(""), None);
        assert_eq!(normalized_content("   "), None);
    }

    #[test]
    fn oversized_message_content_is_rejected() {
        let at_limit = "x".repeat(2000);
        assert_eq!(normalized_content(&at_limit).map(str::len), Some(2000));
        let over_limit = "x".repeat(2001);
        assert_eq!(normalized_content(&over_limit), None);
    }
}
