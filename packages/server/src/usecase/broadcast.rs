//! UseCase: ルーム内ファンアウト（Broadcast Engine）
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - BroadcastService::broadcast() / send_direct() / announce_departure()
//! - 送信失敗した接続の退去処理（eviction）
//!
//! ### どのような状況を想定しているか
//! - 正常系：送信者以外の全員に届く
//! - 異常系：閉じたキュー・満杯のキューを持つ接続は退去させられ、残りのメンバーに退出通知が届く
//! - エッジケース：存在しないルーム、送信者だけのルーム

use std::{collections::VecDeque, sync::Arc};

use crate::{
    domain::{BoardId, ConnectionId, Departure, RoomRegistry},
    infrastructure::dto::websocket::{CursorPayload, ServerMessage},
};

/// Best-effort fanout over the room registry.
///
/// A connection whose outbound queue rejects a message is treated as
/// disconnected: it is removed from the registry and its departure is
/// announced to the rest of the room.
#[derive(Clone)]
pub struct BroadcastService {
    registry: Arc<dyn RoomRegistry>,
}

impl BroadcastService {
    pub fn new(registry: Arc<dyn RoomRegistry>) -> Self {
        Self { registry }
    }

    /// Send `message` to every member of the room except `exclude`.
    ///
    /// Returns the number of members that accepted it. A missing room is a
    /// silent no-op.
    pub async fn broadcast(
        &self,
        board_id: &BoardId,
        message: &ServerMessage,
        exclude: Option<&ConnectionId>,
    ) -> usize {
        let delivery = self
            .registry
            .deliver(board_id, &message.encode(), exclude)
            .await;
        let delivered = delivery.delivered;
        if !delivery.is_clean() {
            self.evict(delivery.failed.into()).await;
        }
        delivered
    }

    /// Send `message` to a single connection. Returns whether it was queued.
    pub async fn send_direct(&self, connection_id: &ConnectionId, message: &ServerMessage) -> bool {
        let delivery = self
            .registry
            .deliver_to(connection_id, &message.encode())
            .await;
        if !delivery.is_clean() {
            self.evict(delivery.failed.into()).await;
        }
        delivery.delivered == 1
    }

    /// Tell the remaining members of a room that a connection has left.
    ///
    /// Sends a cursor retraction first when the connection had an identity,
    /// then `user_left` with the post-leave member count.
    pub async fn announce_departure(&self, departure: &Departure) {
        let mut failed = VecDeque::new();
        self.notify_departure(departure, &mut failed).await;
        self.evict(failed).await;
    }

    async fn notify_departure(&self, departure: &Departure, failed: &mut VecDeque<ConnectionId>) {
        for notice in departure_notices(departure) {
            let delivery = self
                .registry
                .deliver(&departure.board_id, &notice.encode(), None)
                .await;
            failed.extend(delivery.failed);
        }
        tracing::info!(
            board = %departure.board_id,
            connection = %departure.connection_id,
            remaining = departure.remaining,
            "Broadcasted user_left"
        );
    }

    /// Remove dead connections and announce each departure.
    ///
    /// Announcements can uncover further dead peers; they are queued here
    /// rather than handled recursively.
    async fn evict(&self, mut pending: VecDeque<ConnectionId>) {
        while let Some(connection_id) = pending.pop_front() {
            // None: already removed by its own session or an earlier eviction
            let Some(departure) = self.registry.leave(&connection_id).await else {
                continue;
            };
            tracing::warn!(
                board = %departure.board_id,
                connection = %connection_id,
                "Evicted connection after failed send"
            );
            self.notify_departure(&departure, &mut pending).await;
        }
    }
}

fn departure_notices(departure: &Departure) -> Vec<ServerMessage> {
    let mut notices = Vec::with_capacity(2);
    if let Some(user_id) = &departure.identity {
        notices.push(ServerMessage::CursorMoved {
            cursor_data: CursorPayload::removed(user_id.clone()),
        });
    }
    notices.push(ServerMessage::UserLeft {
        board_id: departure.board_id.clone(),
        user_count: departure.remaining,
    });
    notices
}
