use uuid::Uuid;

#[derive(Debug, Clone, serde::Deserialize, serde::Serialize)]
#[serde(tag = "type")]
pub enum ChatSocketMessage {
    #[serde(rename = "message")]
    Message {
        match_id: Uuid,
        message_id: Uuid,
        // None for system messages (venue recommendation)
        sender_pair_id: Option<Uuid>,
        content: String,
        timestamp: chrono::DateTime<chrono::Utc>,
    },
    #[serde(rename = "matched")]
    Matched {
        match_id: Uuid,
        pair1_id: Uuid,
        pair2_id: Uuid,
    },
    #[serde(rename = "typing")]
    Typing {
        match_id: Uuid,
        pair_id: Uuid,
        is_typing: bool,
    },
    #[serde(rename = "message_read")]
    MessageRead {
        match_id: Uuid,
        message_id: Uuid,
        pair_id: Uuid,
    },
    #[serde(rename = "error")]
    Error { message: String },
    #[serde(rename = "ping")]
    Ping,
    #[serde(rename = "pong")]
    Pong,
}

#[derive(Debug, Clone, serde::Deserialize, serde::Serialize)]
pub struct IncomingMessage {
    pub match_id: Uuid,
    pub content: String,
}

#[derive(Debug, Clone)]
pub struct PairConnection {
    pub pair_id: Uuid,
    pub sender: tokio::sync::mpsc::UnboundedSender<ChatSocketMessage>,
}

#[derive(Debug, Clone)]
pub struct MatchRoom {
    pub match_id: Uuid,
    pub connections: std::sync::Arc<dashmap::DashMap<Uuid, PairConnection>>,
}
