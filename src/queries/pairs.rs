use sqlx::PgConnection;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::pairs::{FriendPair, PairStatus, PENDING_MEMBER},
};

pub struct NewPair<'a> {
    pub user1_email: &'a str,
    pub gender: &'a str,
    pub city: &'a str,
    pub bio: Option<&'a str>,
    pub photo1_url: Option<&'a str>,
    pub venues1: Option<&'a [String]>,
}

pub async fn insert_pair(
    conn: &mut PgConnection,
    id: Uuid,
    pair: NewPair<'_>,
) -> AppResult<FriendPair> {
    let inserted = sqlx::query_as::<_, FriendPair>(
        "INSERT INTO friend_pairs (id, user1_email, user2_email, gender, city, bio, photo1_url, venues1, status)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
         RETURNING *",
    )
    .bind(id)
    .bind(pair.user1_email)
    .bind(PENDING_MEMBER)
    .bind(pair.gender)
    .bind(pair.city)
    .bind(pair.bio)
    .bind(pair.photo1_url)
    .bind(pair.venues1)
    .bind(PairStatus::PendingInvite)
    .fetch_one(conn)
    .await
    .map_err(|e| {
        eprintln!("Database insert error (insert_pair): {:?}", e);
        AppError::InternalServerError(anyhow::anyhow!("Failed to create pair"))
    })?;

    Ok(inserted)
}

pub async fn get_pair(conn: &mut PgConnection, pair_id: Uuid) -> AppResult<Option<FriendPair>> {
    let pair = sqlx::query_as::<_, FriendPair>("SELECT * FROM friend_pairs WHERE id = $1")
        .bind(pair_id)
        .fetch_optional(conn)
        .await
        .map_err(|e| {
            eprintln!("Database query error (get_pair): {:?}", e);
            AppError::InternalServerError(anyhow::anyhow!("Database error fetching pair"))
        })?;

    Ok(pair)
}

/// Fill the second member's slot and activate the pair. The status guard in
/// the WHERE clause keeps a replayed invite from hijacking an active pair.
pub async fn complete_pair(
    conn: &mut PgConnection,
    pair_id: Uuid,
    second_member_email: &str,
    photo2_url: Option<&str>,
    venues2: Option<&[String]>,
) -> AppResult<FriendPair> {
    let updated = sqlx::query_as::<_, FriendPair>(
        "UPDATE friend_pairs
         SET user2_email = $2, photo2_url = $3, venues2 = $4, status = $5
         WHERE id = $1 AND status <> $5
         RETURNING *",
    )
    .bind(pair_id)
    .bind(second_member_email)
    .bind(photo2_url)
    .bind(venues2)
    .bind(PairStatus::Active)
    .fetch_optional(&mut *conn)
    .await
    .map_err(|e| {
        eprintln!("Database update error (complete_pair): {:?}", e);
        AppError::InternalServerError(anyhow::anyhow!("Database error completing pair"))
    })?;

    match updated {
        Some(pair) => Ok(pair),
        None => match get_pair(conn, pair_id).await? {
            Some(_) => Err(AppError::Conflict(anyhow::anyhow!("Pair already complete"))),
            None => Err(AppError::NotFound(anyhow::anyhow!("Pair not found"))),
        },
    }
}

/// Candidates the given pair can swipe on: same city, opposite gender tag,
/// active, not itself, and not already liked by it. Insertion order.
pub async fn list_candidates(
    conn: &mut PgConnection,
    for_pair_id: Uuid,
    city: &str,
    not_gender: &str,
) -> AppResult<Vec<FriendPair>> {
    let candidates = sqlx::query_as::<_, FriendPair>(
        "SELECT p.* FROM friend_pairs p
         WHERE p.id <> $1
           AND p.city = $2
           AND p.gender <> $3
           AND p.status = $4
           AND NOT EXISTS (
               SELECT 1 FROM pair_likes l
               WHERE l.from_pair_id = $1 AND l.to_pair_id = p.id
           )
         ORDER BY p.created_at",
    )
    .bind(for_pair_id)
    .bind(city)
    .bind(not_gender)
    .bind(PairStatus::Active)
    .fetch_all(conn)
    .await
    .map_err(|e| {
        eprintln!("Database query error (list_candidates): {:?}", e);
        AppError::InternalServerError(anyhow::anyhow!("Database error listing candidates"))
    })?;

    Ok(candidates)
}
