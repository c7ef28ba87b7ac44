use crate::models::websocket::{ChatSocketMessage, MatchRoom, PairConnection};
use dashmap::DashMap;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Clone)]
pub struct ChatSocketManager {
    // Map of match_id -> MatchRoom
    pub rooms: Arc<DashMap<Uuid, MatchRoom>>,
    // Map of pair_id -> Set of match_ids the pair is connected to
    pub pair_rooms: Arc<DashMap<Uuid, Arc<DashMap<Uuid, ()>>>>,
    // Map of pair_id -> live outgoing channel, kept even when the pair has
    // no rooms yet so it can be pulled into rooms created after connect
    pub senders: Arc<DashMap<Uuid, tokio::sync::mpsc::UnboundedSender<ChatSocketMessage>>>,
}

impl ChatSocketManager {
    pub fn new() -> Self {
        Self {
            rooms: Arc::new(DashMap::new()),
            pair_rooms: Arc::new(DashMap::new()),
            senders: Arc::new(DashMap::new()),
        }
    }

    pub fn register_pair(
        &self,
        pair_id: Uuid,
        sender: tokio::sync::mpsc::UnboundedSender<ChatSocketMessage>,
    ) {
        self.senders.insert(pair_id, sender);
    }

    /// Put an already-connected pair into a room that did not exist when it
    /// connected, such as a match created mid-session. No-op for offline pairs.
    pub fn join_connected_pair(&self, match_id: Uuid, pair_id: Uuid) {
        let sender = match self.senders.get(&pair_id) {
            Some(sender) => sender.value().clone(),
            None => return,
        };
        self.join_room(match_id, pair_id, sender);
    }

    pub fn join_room(
        &self,
        match_id: Uuid,
        pair_id: Uuid,
        sender: tokio::sync::mpsc::UnboundedSender<ChatSocketMessage>,
    ) {
        let room = self.rooms.entry(match_id).or_insert_with(|| MatchRoom {
            match_id,
            connections: Arc::new(DashMap::new()),
        });

        let connection = PairConnection { pair_id, sender };
        room.connections.insert(pair_id, connection);

        // Track which rooms the pair is in
        let room_set = self
            .pair_rooms
            .entry(pair_id)
            .or_insert_with(|| Arc::new(DashMap::new()));
        room_set.insert(match_id, ());
    }

    pub fn leave_all_rooms(&self, pair_id: Uuid) {
        self.senders.remove(&pair_id);
        if let Some((_, room_ids)) = self.pair_rooms.remove(&pair_id) {
            for match_id in room_ids.iter() {
                if let Some(room) = self.rooms.get(match_id.key()) {
                    room.connections.remove(&pair_id);

                    // Clean up empty room
                    if room.connections.is_empty() {
                        self.rooms.remove(match_id.key());
                    }
                }
            }
        }
    }

    pub async fn broadcast_to_match(
        &self,
        match_id: Uuid,
        message: ChatSocketMessage,
        exclude_pair: Option<Uuid>,
    ) {
        if let Some(room) = self.rooms.get(&match_id) {
            for connection in room.connections.iter() {
                let pair_id = *connection.key();

                if let Some(exclude) = exclude_pair {
                    if pair_id == exclude {
                        continue;
                    }
                }
                if let Err(e) = connection.sender.send(message.clone()) {
                    eprintln!("Failed to send message to pair {}: {}", pair_id, e);
                    // Connection is dead, remove it
                    room.connections.remove(&pair_id);
                }
            }
        }
    }

    pub async fn send_to_pair(&self, pair_id: Uuid, message: ChatSocketMessage) -> bool {
        let sent = match self.senders.get(&pair_id) {
            Some(sender) => match sender.send(message) {
                Ok(_) => true,
                Err(e) => {
                    eprintln!("Failed to send message to pair {}: {}", pair_id, e);
                    false
                }
            },
            None => return false,
        };
        if !sent {
            // Channel is dead, the pair is gone
            self.senders.remove(&pair_id);
        }
        sent
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn send_to_pair_reaches_a_pair_with_no_rooms() {
        let manager = ChatSocketManager::new();
        let pair_id = Uuid::new_v4();
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        manager.register_pair(pair_id, tx);

        assert!(manager.send_to_pair(pair_id, ChatSocketMessage::Pong).await);
        assert!(matches!(rx.recv().await, Some(ChatSocketMessage::Pong)));
    }

    #[tokio::test]
    async fn connected_pairs_receive_broadcasts_for_a_room_created_later() {
        let manager = ChatSocketManager::new();
        let match_id = Uuid::new_v4();
        let (pair1, pair2) = (Uuid::new_v4(), Uuid::new_v4());
        let (tx1, mut rx1) = tokio::sync::mpsc::unbounded_channel();
        let (tx2, mut rx2) = tokio::sync::mpsc::unbounded_channel();
        manager.register_pair(pair1, tx1);
        manager.register_pair(pair2, tx2);

        // Both pairs connected before the match existed
        manager.join_connected_pair(match_id, pair1);
        manager.join_connected_pair(match_id, pair2);

        let message = ChatSocketMessage::Matched {
            match_id,
            pair1_id: pair1,
            pair2_id: pair2,
        };
        manager.broadcast_to_match(match_id, message, None).await;

        assert!(matches!(
            rx1.recv().await,
            Some(ChatSocketMessage::Matched { .. })
        ));
        assert!(matches!(
            rx2.recv().await,
            Some(ChatSocketMessage::Matched { .. })
        ));
    }

    #[test]
    fn join_connected_pair_ignores_offline_pairs() {
        let manager = ChatSocketManager::new();
        let match_id = Uuid::new_v4();
        manager.join_connected_pair(match_id, Uuid::new_v4());
        assert!(manager.rooms.get(&match_id).is_none());
    }

    #[tokio::test]
    async fn leave_all_rooms_unregisters_the_pair() {
        let manager = ChatSocketManager::new();
        let pair_id = Uuid::new_v4();
        let (tx, _rx) = tokio::sync::mpsc::unbounded_channel();
        manager.register_pair(pair_id, tx);
        manager.join_connected_pair(Uuid::new_v4(), pair_id);

        manager.leave_all_rooms(pair_id);
        assert!(!manager.send_to_pair(pair_id, ChatSocketMessage::Pong).await);
    }
}
