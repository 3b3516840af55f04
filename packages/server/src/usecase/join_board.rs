//! UseCase: ボード参加処理（Connecting → Joined）
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - JoinBoardUseCase::execute() メソッド
//! - 新規メンバーへの user_count_update と、既存メンバーへの user_joined
//!
//! ### どのような状況を想定しているか
//! - 正常系：2 人目の参加（既存メンバーに通知）
//! - エッジケース：1 人目の参加（通知対象なし）

use std::sync::Arc;

use crate::{
    domain::{Connection, Greeting, RoomRegistry},
    infrastructure::dto::websocket::ServerMessage,
};

use super::broadcast::BroadcastService;

/// ボード参加のユースケース
pub struct JoinBoardUseCase {
    registry: Arc<dyn RoomRegistry>,
    broadcaster: BroadcastService,
}

impl JoinBoardUseCase {
    pub fn new(registry: Arc<dyn RoomRegistry>) -> Self {
        let broadcaster = BroadcastService::new(registry.clone());
        Self {
            registry,
            broadcaster,
        }
    }

    /// ボード参加を実行
    ///
    /// # Returns
    ///
    /// 参加後のルームのメンバー数
    pub async fn execute(&self, connection: Connection) -> usize {
        let connection_id = connection.id;
        let board_id = connection.board_id.clone();

        // 1. 新規メンバー本人に現在の人数を送る（登録と同じロック内でキューに入れる）
        let greeting_board_id = board_id.clone();
        let greeting: Greeting = Box::new(move |user_count| {
            ServerMessage::UserCountUpdate {
                board_id: greeting_board_id,
                user_count,
            }
            .encode()
        });
        let user_count = self
            .registry
            .join_with_greeting(connection, Some(greeting))
            .await;
        tracing::info!(board = %board_id, connection = %connection_id, user_count, "Connection joined board");

        // 2. 本人以外に参加を通知
        self.broadcaster
            .broadcast(
                &board_id,
                &ServerMessage::UserJoined {
                    board_id: board_id.clone(),
                    user_count,
                },
                Some(&connection_id),
            )
            .await;

        user_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{BoardId, ConnectionIdFactory, Timestamp},
        infrastructure::repository::InMemoryRoomRegistry,
    };
    use serde_json::{Value, json};
    use tokio::sync::mpsc;

    fn connection(board_id: &str) -> (Connection, mpsc::Receiver<String>) {
        let (tx, rx) = mpsc::channel(8);
        let connection = Connection::new(
            ConnectionIdFactory::generate(),
            BoardId::new(board_id.to_string()).unwrap(),
            tx,
            Timestamp::new(0),
        );
        (connection, rx)
    }

    fn next_json(rx: &mut mpsc::Receiver<String>) -> Value {
        serde_json::from_str(&rx.try_recv().expect("expected a queued message")).unwrap()
    }

    #[tokio::test]
    async fn test_join_alone_receives_only_count() {
        // テスト項目: 1 人目は user_count_update だけを受け取る
        // given (前提条件):
        let registry = Arc::new(InMemoryRoomRegistry::new());
        let usecase = JoinBoardUseCase::new(registry);
        let (alice, mut alice_rx) = connection("b1");

        // when (操作):
        let count = usecase.execute(alice).await;

        // then (期待する結果):
        assert_eq!(count, 1);
        assert_eq!(
            next_json(&mut alice_rx),
            json!({"type": "user_count_update", "board_id": "b1", "user_count": 1})
        );
        assert!(alice_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_second_join_notifies_existing_member() {
        // テスト項目: 2 人目の参加で既存メンバーに user_joined が届く
        // given (前提条件):
        let registry = Arc::new(InMemoryRoomRegistry::new());
        let usecase = JoinBoardUseCase::new(registry);
        let (alice, mut alice_rx) = connection("b1");
        let (bob, mut bob_rx) = connection("b1");
        usecase.execute(alice).await;
        next_json(&mut alice_rx);

        // when (操作):
        let count = usecase.execute(bob).await;

        // then (期待する結果):
        assert_eq!(count, 2);
        assert_eq!(
            next_json(&mut bob_rx),
            json!({"type": "user_count_update", "board_id": "b1", "user_count": 2})
        );
        assert!(bob_rx.try_recv().is_err());
        assert_eq!(
            next_json(&mut alice_rx),
            json!({"type": "user_joined", "board_id": "b1", "user_count": 2})
        );
    }

    #[tokio::test]
    async fn test_join_other_board_is_isolated() {
        // テスト項目: 別ボードへの参加は他のボードに通知されない
        // given (前提条件):
        let registry = Arc::new(InMemoryRoomRegistry::new());
        let usecase = JoinBoardUseCase::new(registry);
        let (alice, mut alice_rx) = connection("b1");
        let (bob, _bob_rx) = connection("b2");
        usecase.execute(alice).await;
        next_json(&mut alice_rx);

        // when (操作):
        let count = usecase.execute(bob).await;

        // then (期待する結果):
        assert_eq!(count, 1);
        assert!(alice_rx.try_recv().is_err());
    }
}
