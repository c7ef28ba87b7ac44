use chrono::{DateTime, Utc};
use sqlx::PgConnection;
use uuid::Uuid;

use crate::error::{AppError, AppResult};

/// Retire any still-live codes for this email so at most one code is valid
/// per address at a time.
pub async fn invalidate_codes_for_email(conn: &mut PgConnection, email: &str) -> AppResult<()> {
    sqlx::query("UPDATE verification_codes SET used = TRUE WHERE email = $1 AND used = FALSE")
        .bind(email)
        .execute(conn)
        .await
        .map_err(|e| {
            eprintln!("Database update error (invalidate_codes_for_email): {:?}", e);
            AppError::InternalServerError(anyhow::anyhow!(
                "Database error invalidating old verification codes"
            ))
        })?;
    Ok(())
}

pub async fn insert_verification_code(
    conn: &mut PgConnection,
    email: &str,
    code: &str,
    expires_at: DateTime<Utc>,
) -> AppResult<()> {
    sqlx::query(
        "INSERT INTO verification_codes (id, email, code, expires_at) VALUES ($1, $2, $3, $4)",
    )
    .bind(Uuid::new_v4())
    .bind(email)
    .bind(code)
    .bind(expires_at)
    .execute(conn)
    .await
    .map_err(|e| {
        eprintln!("Database insert error (insert_verification_code): {:?}", e);
        AppError::InternalServerError(anyhow::anyhow!(
            "Database error storing verification code"
        ))
    })?;
    Ok(())
}

/// One atomic check-and-consume. Returns false for any mismatch without
/// saying whether the email or the code was wrong.
pub async fn consume_verification_code(
    conn: &mut PgConnection,
    email: &str,
    code: &str,
) -> AppResult<bool> {
    let consumed: Option<Uuid> = sqlx::query_scalar(
        "UPDATE verification_codes SET used = TRUE
         WHERE email = $1 AND code = $2 AND used = FALSE AND expires_at > now()
         RETURNING id",
    )
    .bind(email)
    .bind(code)
    .fetch_optional(conn)
    .await
    .map_err(|e| {
        eprintln!("Database update error (consume_verification_code): {:?}", e);
        AppError::InternalServerError(anyhow::anyhow!(
            "Database error checking verification code"
        ))
    })?;

    Ok(consumed.is_some())
}
