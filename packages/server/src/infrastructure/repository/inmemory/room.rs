//! InMemory Room Registry 実装
//!
//! ドメイン層が定義する RoomRegistry trait の具体的な実装。
//! 1 つの Mutex でボード → 接続集合と接続 → メンバー情報の両方を守るため、
//! join / leave / set_identity は broadcast のスナップショット取得に対してアトミック。

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use tokio::sync::{Mutex, mpsc::error::TrySendError};

use crate::domain::{
    BoardId, Connection, ConnectionId, Delivery, Departure, Greeting, OutboundSender,
    RoomRegistry, RoomSummary, Timestamp, UserId,
};

/// Session state owned by the registry for one live connection
struct Member {
    board_id: BoardId,
    sender: OutboundSender,
    /// Learned from the first `cursor_moved`; never overwritten
    identity: Option<UserId>,
}

struct RoomEntry {
    members: HashSet<ConnectionId>,
    created_at: Timestamp,
}

#[derive(Default)]
struct RegistryState {
    /// Invariant: every entry has at least one member
    rooms: HashMap<BoardId, RoomEntry>,
    members: HashMap<ConnectionId, Member>,
}

/// インメモリ Room Registry 実装
#[derive(Default)]
pub struct InMemoryRoomRegistry {
    state: Mutex<RegistryState>,
}

impl InMemoryRoomRegistry {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Offer `payload` to each queue without waiting.
///
/// A full queue counts as a failure just like a closed one.
fn offer(targets: Vec<(ConnectionId, OutboundSender)>, payload: &str) -> Delivery {
    let mut delivery = Delivery::default();
    for (connection_id, sender) in targets {
        match sender.try_send(payload.to_string()) {
            Ok(()) => delivery.delivered += 1,
            Err(TrySendError::Full(_)) => {
                tracing::warn!(connection = %connection_id, "Outbound queue full, dropping slow client");
                delivery.failed.push(connection_id);
            }
            Err(TrySendError::Closed(_)) => {
                tracing::debug!(connection = %connection_id, "Outbound queue closed");
                delivery.failed.push(connection_id);
            }
        }
    }
    delivery
}

#[async_trait]
impl RoomRegistry for InMemoryRoomRegistry {
    async fn join_with_greeting(&self, connection: Connection, greeting: Option<Greeting>) -> usize {
        let mut state = self.state.lock().await;

        if let Some(existing) = state.members.get(&connection.id) {
            tracing::error!(
                connection = %connection.id,
                board = %existing.board_id,
                "Connection joined twice; ignoring"
            );
            let board_id = existing.board_id.clone();
            return state
                .rooms
                .get(&board_id)
                .map_or(0, |room| room.members.len());
        }

        let Connection {
            id,
            board_id,
            sender,
            connected_at,
        } = connection;

        let room = state
            .rooms
            .entry(board_id.clone())
            .or_insert_with(|| RoomEntry {
                members: HashSet::new(),
                created_at: connected_at,
            });
        room.members.insert(id);
        let count = room.members.len();

        // queued while the lock is held, so no broadcast can overtake it
        if let Some(greet) = greeting {
            if let Err(e) = sender.try_send(greet(count)) {
                tracing::warn!(connection = %id, "Failed to queue greeting: {}", e);
            }
        }

        state.members.insert(
            id,
            Member {
                board_id,
                sender,
                identity: None,
            },
        );
        count
    }

    async fn leave(&self, connection_id: &ConnectionId) -> Option<Departure> {
        let mut state = self.state.lock().await;

        let member = state.members.remove(connection_id)?;
        let remaining = match state.rooms.get_mut(&member.board_id) {
            Some(room) => {
                room.members.remove(connection_id);
                room.members.len()
            }
            None => 0,
        };
        if remaining == 0 {
            state.rooms.remove(&member.board_id);
        }

        Some(Departure {
            connection_id: *connection_id,
            board_id: member.board_id,
            identity: member.identity,
            remaining,
        })
    }

    async fn size(&self, board_id: &BoardId) -> usize {
        let state = self.state.lock().await;
        state.rooms.get(board_id).map_or(0, |room| room.members.len())
    }

    async fn set_identity(&self, connection_id: &ConnectionId, user_id: UserId) -> bool {
        let mut state = self.state.lock().await;
        match state.members.get_mut(connection_id) {
            Some(member) if member.identity.is_none() => {
                member.identity = Some(user_id);
                true
            }
            _ => false,
        }
    }

    async fn get_identity(&self, connection_id: &ConnectionId) -> Option<UserId> {
        let state = self.state.lock().await;
        state
            .members
            .get(connection_id)
            .and_then(|member| member.identity.clone())
    }

    async fn deliver(
        &self,
        board_id: &BoardId,
        payload: &str,
        exclude: Option<&ConnectionId>,
    ) -> Delivery {
        // snapshot, then send without holding the lock
        let targets: Vec<(ConnectionId, OutboundSender)> = {
            let state = self.state.lock().await;
            let Some(room) = state.rooms.get(board_id) else {
                return Delivery::default();
            };
            room.members
                .iter()
                .filter(|id| Some(*id) != exclude)
                .filter_map(|id| {
                    state
                        .members
                        .get(id)
                        .map(|member| (*id, member.sender.clone()))
                })
                .collect()
        };
        offer(targets, payload)
    }

    async fn deliver_to(&self, connection_id: &ConnectionId, payload: &str) -> Delivery {
        let target = {
            let state = self.state.lock().await;
            state
                .members
                .get(connection_id)
                .map(|member| (*connection_id, member.sender.clone()))
        };
        offer(target.into_iter().collect(), payload)
    }

    async fn rooms(&self) -> Vec<RoomSummary> {
        let state = self.state.lock().await;
        let mut rooms: Vec<RoomSummary> = state
            .rooms
            .iter()
            .map(|(board_id, room)| RoomSummary {
                board_id: board_id.clone(),
                user_count: room.members.len(),
                created_at: room.created_at,
            })
            .collect();
        rooms.sort_by(|a, b| a.board_id.as_str().cmp(b.board_id.as_str()));
        rooms
    }
}
