//! UseCase: 受信メッセージのルーティング（Joined → Joined / Terminating）
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - HandleMessageUseCase::execute() メソッド
//! - 種別ごとのハンドラ（永続化の委譲、identity の記録、送信者以外へのブロードキャスト）
//!
//! ### なぜこのテストが必要か
//! - 不正な入力でセッションが終了しないことを保証
//! - 永続化の失敗がライブ配信を止めないことを保証
//!
//! ### どのような状況を想定しているか
//! - 正常系：node_moved / node_created / cursor_moved などの配信
//! - 異常系：不正 JSON・未知の type（送信者にだけエラー通知）、必須フィールド欠落（黙って破棄）
//! - エッジケース：disconnect メッセージ、永続化の失敗

use std::sync::Arc;

use crate::{
    domain::{BoardId, ConnectionId, Flow, NodeRepository, RoomRegistry},
    infrastructure::dto::websocket::{ClientMessage, ProtocolError, ServerMessage, decode},
};

use super::broadcast::BroadcastService;

/// 受信メッセージ処理のユースケース
pub struct HandleMessageUseCase {
    registry: Arc<dyn RoomRegistry>,
    repository: Arc<dyn NodeRepository>,
    broadcaster: BroadcastService,
}

impl HandleMessageUseCase {
    pub fn new(registry: Arc<dyn RoomRegistry>, repository: Arc<dyn NodeRepository>) -> Self {
        let broadcaster = BroadcastService::new(registry.clone());
        Self {
            registry,
            repository,
            broadcaster,
        }
    }

    /// 1 フレーム分のテキストを処理
    ///
    /// # Returns
    ///
    /// * `Flow::Continue` - 受信ループを続ける（デコード失敗を含む）
    /// * `Flow::Terminate` - クライアントが disconnect を送った
    pub async fn execute(&self, connection_id: &ConnectionId, board_id: &BoardId, text: &str) -> Flow {
        match decode(text) {
            Ok(message) => self.dispatch(connection_id, board_id, message).await,
            Err(error) => {
                self.reject(connection_id, &error).await;
                Flow::Continue
            }
        }
    }

    /// Answer a frame that could not be decoded.
    ///
    /// Field errors are dropped; everything else gets one error notice sent
    /// to the originating connection only.
    pub async fn reject(&self, connection_id: &ConnectionId, error: &ProtocolError) {
        match error.notice() {
            Some(notice) => {
                tracing::warn!(connection = %connection_id, "Rejected message: {}", error);
                self.broadcaster.send_direct(connection_id, &notice).await;
            }
            None => {
                tracing::debug!(connection = %connection_id, "Dropped message: {}", error);
            }
        }
    }

    async fn dispatch(
        &self,
        connection_id: &ConnectionId,
        board_id: &BoardId,
        message: ClientMessage,
    ) -> Flow {
        let event = match message {
            ClientMessage::Disconnect => {
                tracing::info!(connection = %connection_id, "Client requested disconnect");
                return Flow::Terminate;
            }
            ClientMessage::NodeMoved { node_id, x, y } => {
                // broadcast even if the write fails
                match (x.as_f64(), y.as_f64()) {
                    (Some(position_x), Some(position_y)) => {
                        if let Err(e) = self
                            .repository
                            .update_position(&node_id, board_id, position_x, position_y)
                            .await
                        {
                            tracing::warn!(board = %board_id, node = %node_id, "Failed to persist node position: {}", e);
                        }
                    }
                    _ => {
                        tracing::warn!(board = %board_id, node = %node_id, "Coordinates not representable as f64; skipping persistence");
                    }
                }
                ServerMessage::NodeMoved { node_id, x, y }
            }
            ClientMessage::NodeCreated { node_data } => ServerMessage::NodeCreated { node_data },
            ClientMessage::NodeUpdated { node_id, updates } => {
                ServerMessage::NodeUpdated { node_id, updates }
            }
            ClientMessage::NodeDeleted { node_id } => ServerMessage::NodeDeleted { node_id },
            ClientMessage::EdgeCreated { edge_data } => ServerMessage::EdgeCreated { edge_data },
            ClientMessage::EdgeDeleted { edge_id } => ServerMessage::EdgeDeleted { edge_id },
            ClientMessage::CursorMoved { cursor_data } => {
                if self
                    .registry
                    .set_identity(connection_id, cursor_data.user_id.clone())
                    .await
                {
                    tracing::info!(
                        connection = %connection_id,
                        user = %cursor_data.user_id,
                        "Identity learned from cursor"
                    );
                }
                ServerMessage::CursorMoved {
                    cursor_data: cursor_data.into(),
                }
            }
        };

        let delivered = self
            .broadcaster
            .broadcast(board_id, &event, Some(connection_id))
            .await;
        tracing::debug!(board = %board_id, connection = %connection_id, delivered, "Broadcasted event");
        Flow::Continue
    }
}
