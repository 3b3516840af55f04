//! UseCase: ボード退出処理（Terminating → Closed）
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - LeaveBoardUseCase::execute() メソッド
//! - カーソル削除通知と user_left 通知
//!
//! ### どのような状況を想定しているか
//! - 正常系：identity を持つ接続の退出（カーソル削除 → user_left）
//! - エッジケース：すでに退去済みの接続（通知は重複しない）

use std::sync::Arc;

use crate::domain::{ConnectionId, Departure, RoomRegistry};

use super::broadcast::BroadcastService;

/// ボード退出のユースケース
pub struct LeaveBoardUseCase {
    registry: Arc<dyn RoomRegistry>,
    broadcaster: BroadcastService,
}

impl LeaveBoardUseCase {
    pub fn new(registry: Arc<dyn RoomRegistry>) -> Self {
        let broadcaster = BroadcastService::new(registry.clone());
        Self {
            registry,
            broadcaster,
        }
    }

    /// ボード退出を実行
    ///
    /// # Returns
    ///
    /// * `Some(Departure)` - この呼び出しで退出し、通知を送った
    /// * `None` - 既に退去済み（送信失敗による eviction 等）。通知は送らない
    pub async fn execute(&self, connection_id: &ConnectionId) -> Option<Departure> {
        let Some(departure) = self.registry.leave(connection_id).await else {
            tracing::debug!(connection = %connection_id, "Connection already left");
            return None;
        };
        tracing::info!(
            board = %departure.board_id,
            connection = %connection_id,
            identity = ?departure.identity.as_ref().map(|u| u.as_str()),
            "Connection left board"
        );

        self.broadcaster.announce_departure(&departure).await;
        Some(departure)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{BoardId, Connection, ConnectionIdFactory, Timestamp, UserId},
        infrastructure::repository::InMemoryRoomRegistry,
    };
    use serde_json::{Value, json};
    use tokio::sync::mpsc;

    async fn join(
        registry: &Arc<InMemoryRoomRegistry>,
        board_id: &str,
    ) -> (ConnectionId, mpsc::Receiver<String>) {
        let (tx, rx) = mpsc::channel(8);
        let id = ConnectionIdFactory::generate();
        registry
            .join(Connection::new(
                id,
                BoardId::new(board_id.to_string()).unwrap(),
                tx,
                Timestamp::new(0),
            ))
            .await;
        (id, rx)
    }

    fn next_json(rx: &mut mpsc::Receiver<String>) -> Value {
        serde_json::from_str(&rx.try_recv().expect("expected a queued message")).unwrap()
    }

    #[tokio::test]
    async fn test_leave_with_identity_retracts_cursor_then_announces() {
        // テスト項目: identity を持つ接続が退出すると、カーソル削除 → user_left の順に届く
        // given (前提条件):
        let registry = Arc::new(InMemoryRoomRegistry::new());
        let usecase = LeaveBoardUseCase::new(registry.clone());
        let (alice, _alice_rx) = join(&registry, "b1").await;
        let (_bob, mut bob_rx) = join(&registry, "b1").await;
        registry
            .set_identity(&alice, UserId::new("u1".to_string()).unwrap())
            .await;

        // when (操作):
        let departure = usecase.execute(&alice).await;

        // then (期待する結果):
        assert_eq!(departure.map(|d| d.remaining), Some(1));
        assert_eq!(
            next_json(&mut bob_rx),
            json!({"type": "cursor_moved", "cursor_data": {"user_id": "u1", "x": null, "y": null, "timestamp": null}})
        );
        assert_eq!(
            next_json(&mut bob_rx),
            json!({"type": "user_left", "board_id": "b1", "user_count": 1})
        );
        assert!(bob_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_leave_twice_notifies_once() {
        // テスト項目: 二回目の退出処理は何もしない（user_left は一度だけ）
        // given (前提条件):
        let registry = Arc::new(InMemoryRoomRegistry::new());
        let usecase = LeaveBoardUseCase::new(registry.clone());
        let (alice, _alice_rx) = join(&registry, "b1").await;
        let (_bob, mut bob_rx) = join(&registry, "b1").await;

        // when (操作):
        let first = usecase.execute(&alice).await;
        let second = usecase.execute(&alice).await;

        // then (期待する結果):
        assert!(first.is_some());
        assert!(second.is_none());
        assert_eq!(next_json(&mut bob_rx)["type"], "user_left");
        assert!(bob_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_last_member_leaving_removes_room() {
        // テスト項目: 最後のメンバーが退出するとルームが消える
        // given (前提条件):
        let registry = Arc::new(InMemoryRoomRegistry::new());
        let usecase = LeaveBoardUseCase::new(registry.clone());
        let (alice, _alice_rx) = join(&registry, "b1").await;

        // when (操作):
        let departure = usecase.execute(&alice).await;

        // then (期待する結果):
        assert_eq!(departure.map(|d| d.remaining), Some(0));
        assert!(registry.rooms().await.is_empty());
    }
}
