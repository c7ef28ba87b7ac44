use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, sqlx::Type)]
#[sqlx(type_name = "match_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    Active,
}

/*
id UUID PRIMARY KEY,
pair1_id UUID NOT NULL REFERENCES friend_pairs(id),
pair2_id UUID NOT NULL REFERENCES friend_pairs(id),
status match_status NOT NULL DEFAULT 'active',
created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
UNIQUE (pair1_id, pair2_id),
CHECK (pair1_id < pair2_id)
 */
#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct PairMatch {
    pub id: Uuid,
    pub pair1_id: Uuid,
    pub pair2_id: Uuid,
    pub status: MatchStatus,
    pub created_at: DateTime<Utc>,
}

// Match rows are stored with the smaller pair id first so the unique
// constraint on (pair1_id, pair2_id) holds per unordered pair.
pub fn canonical_pair(a: Uuid, b: Uuid) -> (Uuid, Uuid) {
    (std::cmp::min(a, b), std::cmp::max(a, b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_pair_is_order_independent() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        assert_eq!(canonical_pair(a, b), canonical_pair(b, a));
        let (first, second) = canonical_pair(a, b);
        assert!(first <= second);
    }

    #[test]
    fn canonical_pair_of_equal_ids_is_identity() {
        let a = Uuid::new_v4();
        assert_eq!(canonical_pair(a, a), (a, a));
    }
}
