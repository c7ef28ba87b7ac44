use sqlx::PgConnection;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::matches::{canonical_pair, MatchStatus, PairMatch},
};

/// Directed like, idempotent: repeating an identical like is a no-op thanks
/// to the unique index on (from_pair_id, to_pair_id). Returns whether a row
/// was actually inserted.
pub async fn insert_like(
    conn: &mut PgConnection,
    from_pair_id: Uuid,
    to_pair_id: Uuid,
) -> AppResult<bool> {
    let result = sqlx::query(
        "INSERT INTO pair_likes (id, from_pair_id, to_pair_id) VALUES ($1, $2, $3)
         ON CONFLICT (from_pair_id, to_pair_id) DO NOTHING",
    )
    .bind(Uuid::new_v4())
    .bind(from_pair_id)
    .bind(to_pair_id)
    .execute(conn)
    .await
    .map_err(|e| {
        eprintln!("Database insert error (insert_like): {:?}", e);
        AppError::InternalServerError(anyhow::anyhow!("Failed to record like"))
    })?;

    Ok(result.rows_affected() > 0)
}

pub async fn reverse_like_exists(
    conn: &mut PgConnection,
    from_pair_id: Uuid,
    to_pair_id: Uuid,
) -> AppResult<bool> {
    let exists: Option<bool> =
        sqlx::query_scalar("SELECT TRUE FROM pair_likes WHERE from_pair_id = $1 AND to_pair_id = $2")
            .bind(to_pair_id)
            .bind(from_pair_id)
            .fetch_optional(conn)
            .await
            .map_err(|e| {
                eprintln!("Database query error (reverse_like_exists): {:?}", e);
                AppError::InternalServerError(anyhow::anyhow!("Database error checking likes"))
            })?;

    Ok(exists.is_some())
}

/// Create the match for an unordered pair. Ids are stored canonically ordered
/// so the unique constraint guarantees exactly one row per unordered pair even
/// when reciprocal likes land concurrently; losing the race returns None.
pub async fn insert_match(
    conn: &mut PgConnection,
    a_pair_id: Uuid,
    b_pair_id: Uuid,
) -> AppResult<Option<PairMatch>> {
    let (pair1_id, pair2_id) = canonical_pair(a_pair_id, b_pair_id);

    let inserted = sqlx::query_as::<_, PairMatch>(
        "INSERT INTO pair_matches (id, pair1_id, pair2_id, status) VALUES ($1, $2, $3, $4)
         ON CONFLICT (pair1_id, pair2_id) DO NOTHING
         RETURNING *",
    )
    .bind(Uuid::new_v4())
    .bind(pair1_id)
    .bind(pair2_id)
    .bind(MatchStatus::Active)
    .fetch_optional(conn)
    .await
    .map_err(|e| {
        eprintln!("Database insert error (insert_match): {:?}", e);
        AppError::InternalServerError(anyhow::anyhow!("Failed to create match"))
    })?;

    Ok(inserted)
}

pub async fn find_match_between(
    conn: &mut PgConnection,
    a_pair_id: Uuid,
    b_pair_id: Uuid,
) -> AppResult<Option<PairMatch>> {
    let (pair1_id, pair2_id) = canonical_pair(a_pair_id, b_pair_id);

    let found = sqlx::query_as::<_, PairMatch>(
        "SELECT * FROM pair_matches WHERE pair1_id = $1 AND pair2_id = $2",
    )
    .bind(pair1_id)
    .bind(pair2_id)
    .fetch_optional(conn)
    .await
    .map_err(|e| {
        eprintln!("Database query error (find_match_between): {:?}", e);
        AppError::InternalServerError(anyhow::anyhow!("Database error fetching match"))
    })?;

    Ok(found)
}

pub async fn get_match(conn: &mut PgConnection, match_id: Uuid) -> AppResult<PairMatch> {
    let found = sqlx::query_as::<_, PairMatch>("SELECT * FROM pair_matches WHERE id = $1")
        .bind(match_id)
        .fetch_optional(conn)
        .await
        .map_err(|e| {
            eprintln!("Database query error (get_match): {:?}", e);
            AppError::InternalServerError(anyhow::anyhow!("Database error fetching match"))
        })?;

    match found {
        Some(m) => Ok(m),
        None => Err(AppError::NotFound(anyhow::anyhow!("Match not found"))),
    }
}

pub async fn list_matches_for_pair(
    conn: &mut PgConnection,
    pair_id: Uuid,
) -> AppResult<Vec<PairMatch>> {
    let matches = sqlx::query_as::<_, PairMatch>(
        "SELECT * FROM pair_matches WHERE pair1_id = $1 OR pair2_id = $1 ORDER BY created_at",
    )
    .bind(pair_id)
    .fetch_all(conn)
    .await
    .map_err(|e| {
        eprintln!("Database query error (list_matches_for_pair): {:?}", e);
        AppError::InternalServerError(anyhow::anyhow!("Database error listing matches"))
    })?;

    Ok(matches)
}

pub async fn match_ids_for_pair(conn: &mut PgConnection, pair_id: Uuid) -> AppResult<Vec<Uuid>> {
    let ids: Vec<Uuid> = sqlx::query_scalar(
        "SELECT id FROM pair_matches WHERE pair1_id = $1 OR pair2_id = $1",
    )
    .bind(pair_id)
    .fetch_all(conn)
    .await
    .map_err(|e| {
        eprintln!("Database query error (match_ids_for_pair): {:?}", e);
        AppError::InternalServerError(anyhow::anyhow!("Database error listing matches"))
    })?;

    Ok(ids)
}
