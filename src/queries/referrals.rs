use chrono::{DateTime, Utc};
use sqlx::PgConnection;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::referrals::{CodeRejection, ReferralCode},
    utils::codes,
};

// Collision retries before giving up on code generation.
const MAX_CODE_ATTEMPTS: usize = 5;

pub struct NewReferral<'a> {
    pub created_by_email: Option<&'a str>,
    pub email_to: Option<&'a str>,
    pub inviter_pair_id: Option<Uuid>,
    pub expires_at: DateTime<Utc>,
}

/// Generate a code, check the registry for a live collision, insert. The
/// generator gives no uniqueness guarantee, so a handful of attempts back the
/// unique index on `code`.
pub async fn issue_referral_code(
    conn: &mut PgConnection,
    referral: NewReferral<'_>,
) -> AppResult<ReferralCode> {
    for _ in 0..MAX_CODE_ATTEMPTS {
        let code = codes::referral_code();

        let collision: Option<bool> = sqlx::query_scalar(
            "SELECT TRUE FROM referral_codes WHERE code = $1 AND used = FALSE AND expires_at > now()",
        )
        .bind(&code)
        .fetch_optional(&mut *conn)
        .await
        .map_err(|e| {
            AppError::InternalServerError(anyhow::anyhow!("Failed to check referral code: {}", e))
        })?;

        if collision.is_some() {
            continue;
        }

        let inserted = sqlx::query_as::<_, ReferralCode>(
            "INSERT INTO referral_codes (id, code, created_by_email, email_to, inviter_pair_id, expires_at)
             VALUES ($1, $2, $3, $4, $5, $6)
             ON CONFLICT (code) DO NOTHING
             RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(&code)
        .bind(referral.created_by_email)
        .bind(referral.email_to)
        .bind(referral.inviter_pair_id)
        .bind(referral.expires_at)
        .fetch_optional(&mut *conn)
        .await
        .map_err(|e| {
            AppError::InternalServerError(anyhow::anyhow!("Failed to create referral code: {}", e))
        })?;

        // Lost a race on the unique index: try a fresh code.
        if let Some(record) = inserted {
            return Ok(record);
        }
    }

    Err(AppError::InternalServerError(anyhow::anyhow!(
        "Could not generate a unique referral code"
    )))
}

pub async fn find_referral_by_code(
    conn: &mut PgConnection,
    code: &str,
) -> AppResult<Option<ReferralCode>> {
    let record = sqlx::query_as::<_, ReferralCode>("SELECT * FROM referral_codes WHERE code = $1")
        .bind(code)
        .fetch_optional(conn)
        .await
        .map_err(|e| {
            eprintln!("Database query error (find_referral_by_code): {:?}", e);
            AppError::InternalServerError(anyhow::anyhow!("Database error fetching referral code"))
        })?;

    Ok(record)
}

/// Atomic single-use redemption. The guarded UPDATE succeeds at most once per
/// code; when it matches no row the failure is classified from a follow-up
/// read so a second consume is rejected rather than silently succeeding.
pub async fn consume_referral_code(
    conn: &mut PgConnection,
    code: &str,
    consumer_email: &str,
) -> AppResult<ReferralCode> {
    let consumed = sqlx::query_as::<_, ReferralCode>(
        "UPDATE referral_codes SET used = TRUE, used_by_email = $2
         WHERE code = $1 AND used = FALSE AND expires_at > now()
         RETURNING *",
    )
    .bind(code)
    .bind(consumer_email)
    .fetch_optional(&mut *conn)
    .await
    .map_err(|e| {
        eprintln!("Database update error (consume_referral_code): {:?}", e);
        AppError::InternalServerError(anyhow::anyhow!("Database error consuming referral code"))
    })?;

    if let Some(record) = consumed {
        return Ok(record);
    }

    match find_referral_by_code(&mut *conn, code).await? {
        Some(record) => match record.usable_at(Utc::now()) {
            Err(CodeRejection::AlreadyUsed) => Err(AppError::Conflict(anyhow::anyhow!(
                "Referral code already used"
            ))),
            Err(CodeRejection::Expired) => {
                Err(AppError::Gone(anyhow::anyhow!("Referral code expired")))
            }
            // Usable but the guarded update missed it: raced with another consumer.
            Ok(()) => Err(AppError::Conflict(anyhow::anyhow!(
                "Referral code already used"
            ))),
        },
        None => Err(AppError::NotFound(anyhow::anyhow!("Referral code not found"))),
    }
}

pub async fn mark_referral_email_sent(conn: &mut PgConnection, code_id: Uuid) -> AppResult<()> {
    sqlx::query("UPDATE referral_codes SET email_sent = TRUE WHERE id = $1")
        .bind(code_id)
        .execute(conn)
        .await
        .map_err(|e| {
            eprintln!("Database update error (mark_referral_email_sent): {:?}", e);
            AppError::InternalServerError(anyhow::anyhow!(
                "Database error marking referral email sent"
            ))
        })?;
    Ok(())
}
