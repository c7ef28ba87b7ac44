use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairSession {
    pub pair_id: uuid::Uuid,
    pub email: String,
}
