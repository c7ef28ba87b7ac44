use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/*
id UUID PRIMARY KEY,
code TEXT NOT NULL UNIQUE,
created_by_email TEXT,
email_to TEXT,
inviter_pair_id UUID REFERENCES friend_pairs(id),
used BOOLEAN NOT NULL DEFAULT FALSE,
used_by_email TEXT,
email_sent BOOLEAN NOT NULL DEFAULT FALSE,
expires_at TIMESTAMPTZ NOT NULL,
created_at TIMESTAMPTZ NOT NULL DEFAULT now()
 */
#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct ReferralCode {
    pub id: Uuid,
    pub code: String,
    pub created_by_email: Option<String>,
    pub email_to: Option<String>,
    pub inviter_pair_id: Option<Uuid>,
    pub used: bool,
    pub used_by_email: Option<String>,
    pub email_sent: bool,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// Why a code cannot be redeemed. The HTTP surface collapses all of these into
/// one generic "invalid or expired code" answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeRejection {
    AlreadyUsed,
    Expired,
}

impl ReferralCode {
    /// Partner invites carry the inviter's pair and only complete that pair;
    /// plain access codes gate a fresh signup.
    pub fn is_partner_invite(&self) -> bool {
        self.inviter_pair_id.is_some()
    }

    pub fn usable_at(&self, now: DateTime<Utc>) -> Result<(), CodeRejection> {
        if self.used {
            return Err(CodeRejection::AlreadyUsed);
        }
        if self.expires_at <= now {
            return Err(CodeRejection::Expired);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn code(used: bool, expires_in: Duration) -> ReferralCode {
        let now = Utc::now();
        ReferralCode {
            id: Uuid::new_v4(),
            code: "AB12CD".to_string(),
            created_by_email: Some("a@x.com".to_string()),
            email_to: None,
            inviter_pair_id: None,
            used,
            used_by_email: None,
            email_sent: false,
            expires_at: now + expires_in,
            created_at: now,
        }
    }

    #[test]
    fn fresh_code_is_usable() {
        let c = code(false, Duration::days(7));
        assert!(c.usable_at(Utc::now()).is_ok());
    }

    #[test]
    fn used_code_is_rejected() {
        let c = code(true, Duration::days(7));
        assert_eq!(c.usable_at(Utc::now()), Err(CodeRejection::AlreadyUsed));
    }

    #[test]
    fn expired_code_is_rejected() {
        let c = code(false, Duration::days(-1));
        assert_eq!(c.usable_at(Utc::now()), Err(CodeRejection::Expired));
    }

    #[test]
    fn partner_invite_is_distinguished_from_access_code() {
        let mut c = code(false, Duration::days(7));
        assert!(!c.is_partner_invite());
        c.inviter_pair_id = Some(Uuid::new_v4());
        assert!(c.is_partner_invite());
    }

    #[test]
    fn used_wins_over_expired() {
        // A used code that has also expired reports AlreadyUsed.
        let c = code(true, Duration::days(-1));
        assert_eq!(c.usable_at(Utc::now()), Err(CodeRejection::AlreadyUsed));
    }
}
