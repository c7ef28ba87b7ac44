use sqlx::PgConnection;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::access::{AccessRequest, RequestStatus},
};

pub async fn insert_access_request(
    conn: &mut PgConnection,
    email: &str,
    university: Option<&str>,
    instagram: Option<&str>,
    approval_token: Uuid,
) -> AppResult<AccessRequest> {
    let request = sqlx::query_as::<_, AccessRequest>(
        "INSERT INTO access_requests (id, email, university, instagram, approval_token)
         VALUES ($1, $2, $3, $4, $5)
         RETURNING *",
    )
    .bind(Uuid::new_v4())
    .bind(email)
    .bind(university)
    .bind(instagram)
    .bind(approval_token)
    .fetch_one(conn)
    .await
    .map_err(|e| {
        eprintln!("Database insert error (insert_access_request): {:?}", e);
        AppError::InternalServerError(anyhow::anyhow!("Failed to store access request"))
    })?;

    Ok(request)
}

pub async fn find_request_by_token(
    conn: &mut PgConnection,
    approval_token: Uuid,
) -> AppResult<Option<AccessRequest>> {
    let request = sqlx::query_as::<_, AccessRequest>(
        "SELECT * FROM access_requests WHERE approval_token = $1",
    )
    .bind(approval_token)
    .fetch_optional(conn)
    .await
    .map_err(|e| {
        eprintln!("Database query error (find_request_by_token): {:?}", e);
        AppError::InternalServerError(anyhow::anyhow!("Database error fetching access request"))
    })?;

    Ok(request)
}

pub async fn update_request_status(
    conn: &mut PgConnection,
    approval_token: Uuid,
    status: RequestStatus,
) -> AppResult<()> {
    sqlx::query("UPDATE access_requests SET status = $1 WHERE approval_token = $2")
        .bind(status)
        .bind(approval_token)
        .execute(conn)
        .await
        .map_err(|e| {
            eprintln!("Database update error (update_request_status): {:?}", e);
            AppError::InternalServerError(anyhow::anyhow!(
                "Database error updating access request status"
            ))
        })?;
    Ok(())
}
