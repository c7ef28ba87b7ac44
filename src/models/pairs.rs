use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Placeholder stored in `user2_email` until the partner joins.
pub const PENDING_MEMBER: &str = "pending";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "pair_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PairStatus {
    PendingInvite,
    PendingFriend,
    Active,
}

/*
id UUID PRIMARY KEY,
user1_email TEXT NOT NULL,
user2_email TEXT NOT NULL DEFAULT 'pending',
gender TEXT NOT NULL,
city TEXT NOT NULL,
bio TEXT,
photo1_url TEXT,
photo2_url TEXT,
venues1 TEXT[],
venues2 TEXT[],
status pair_status NOT NULL DEFAULT 'pending_invite',
created_at TIMESTAMPTZ NOT NULL DEFAULT now()
 */
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow)]
pub struct FriendPair {
    pub id: Uuid,
    pub user1_email: String,
    pub user2_email: String,
    pub gender: String,
    pub city: String,
    pub bio: Option<String>,
    pub photo1_url: Option<String>,
    pub photo2_url: Option<String>,
    pub venues1: Option<Vec<String>>,
    pub venues2: Option<Vec<String>>,
    pub status: PairStatus,
    pub created_at: DateTime<Utc>,
}

impl FriendPair {
    /// Both members' venue lists in submission order, for the tally.
    pub fn venue_lists(&self) -> Vec<&[String]> {
        [&self.venues1, &self.venues2]
            .into_iter()
            .flatten()
            .map(|v| v.as_slice())
            .collect()
    }
}
