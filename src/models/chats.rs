use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/*
id UUID PRIMARY KEY,
match_id UUID NOT NULL REFERENCES pair_matches(id),
sender_pair_id UUID REFERENCES friend_pairs(id),
content TEXT NOT NULL,
read BOOLEAN NOT NULL DEFAULT FALSE,
created_at TIMESTAMPTZ NOT NULL DEFAULT now()
 */
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow)]
pub struct ChatMessage {
    pub id: Uuid,
    pub match_id: Uuid,
    // NULL sender marks a system message (venue recommendation)
    pub sender_pair_id: Option<Uuid>,
    pub content: String,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}
