use sqlx::PgConnection;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::chats::ChatMessage,
};

pub async fn insert_message(
    conn: &mut PgConnection,
    id: Uuid,
    match_id: Uuid,
    sender_pair_id: Option<Uuid>,
    content: &str,
) -> AppResult<ChatMessage> {
    let message = sqlx::query_as::<_, ChatMessage>(
        "INSERT INTO chat_messages (id, match_id, sender_pair_id, content)
         VALUES ($1, $2, $3, $4)
         RETURNING *",
    )
    .bind(id)
    .bind(match_id)
    .bind(sender_pair_id)
    .bind(content)
    .fetch_one(conn)
    .await
    .map_err(|e| {
        eprintln!("Database insert error (insert_message): {:?}", e);
        AppError::InternalServerError(anyhow::anyhow!("Failed to store chat message"))
    })?;

    Ok(message)
}

pub async fn list_messages(conn: &mut PgConnection, match_id: Uuid) -> AppResult<Vec<ChatMessage>> {
    let messages = sqlx::query_as::<_, ChatMessage>(
        "SELECT * FROM chat_messages WHERE match_id = $1 ORDER BY created_at",
    )
    .bind(match_id)
    .fetch_all(conn)
    .await
    .map_err(|e| {
        eprintln!("Database query error (list_messages): {:?}", e);
        AppError::InternalServerError(anyhow::anyhow!("Database error listing messages"))
    })?;

    Ok(messages)
}

/// Guard for the one-shot venue recommendation: a NULL sender marks a system
/// message and each match gets at most one.
pub async fn has_system_message(conn: &mut PgConnection, match_id: Uuid) -> AppResult<bool> {
    let exists: Option<bool> = sqlx::query_scalar(
        "SELECT TRUE FROM chat_messages WHERE match_id = $1 AND sender_pair_id IS NULL LIMIT 1",
    )
    .bind(match_id)
    .fetch_optional(conn)
    .await
    .map_err(|e| {
        eprintln!("Database query error (has_system_message): {:?}", e);
        AppError::InternalServerError(anyhow::anyhow!("Database error checking system message"))
    })?;

    Ok(exists.is_some())
}

/// Scoped to the match so a read receipt for one match cannot flip messages
/// of another.
pub async fn mark_message_as_read(
    conn: &mut PgConnection,
    message_id: Uuid,
    match_id: Uuid,
) -> AppResult<()> {
    sqlx::query("UPDATE chat_messages SET read = TRUE WHERE id = $1 AND match_id = $2")
        .bind(message_id)
        .bind(match_id)
        .execute(conn)
        .await
        .map_err(|e| {
            eprintln!("Database update error (mark_message_as_read): {:?}", e);
            AppError::InternalServerError(anyhow::anyhow!("Database error marking message read"))
        })?;
    Ok(())
}

pub async fn pair_in_match(
    conn: &mut PgConnection,
    match_id: Uuid,
    pair_id: Uuid,
) -> AppResult<bool> {
    let exists: Option<bool> = sqlx::query_scalar(
        "SELECT TRUE FROM pair_matches WHERE id = $1 AND (pair1_id = $2 OR pair2_id = $2)",
    )
    .bind(match_id)
    .bind(pair_id)
    .fetch_optional(conn)
    .await
    .map_err(|e| {
        eprintln!("Database query error (pair_in_match): {:?}", e);
        AppError::InternalServerError(anyhow::anyhow!("Database error checking match membership"))
    })?;

    Ok(exists.is_some())
}
