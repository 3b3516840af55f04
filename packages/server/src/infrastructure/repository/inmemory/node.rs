//! InMemory Node Repository 実装
//!
//! 永続化コラボレーター（NodeRepository trait）のインメモリ版。
//! 本番ではキーバリューストアや RDB に置き換える想定。

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{BoardId, EdgeRecord, NodeId, NodeRecord, NodeRepository, RepositoryError};

/// インメモリ Node Repository 実装
#[derive(Default)]
pub struct InMemoryNodeRepository {
    nodes: Mutex<HashMap<NodeId, NodeRecord>>,
    edges: Mutex<Vec<EdgeRecord>>,
}

impl InMemoryNodeRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a node
    pub async fn insert_node(&self, node: NodeRecord) {
        let mut nodes = self.nodes.lock().await;
        nodes.insert(node.id.clone(), node);
    }

    pub async fn insert_edge(&self, edge: EdgeRecord) {
        let mut edges = self.edges.lock().await;
        edges.retain(|e| e.id != edge.id);
        edges.push(edge);
    }

    pub async fn get_node(&self, node_id: &NodeId) -> Option<NodeRecord> {
        let nodes = self.nodes.lock().await;
        nodes.get(node_id).cloned()
    }
}

#[async_trait]
impl NodeRepository for InMemoryNodeRepository {
    async fn update_position(
        &self,
        node_id: &NodeId,
        board_id: &BoardId,
        x: f64,
        y: f64,
    ) -> Result<(), RepositoryError> {
        let mut nodes = self.nodes.lock().await;
        let node = nodes
            .get_mut(node_id)
            .filter(|node| &node.board_id == board_id)
            .ok_or_else(|| RepositoryError::NodeNotFound(node_id.to_string()))?;
        node.position_x = Some(x);
        node.position_y = Some(y);
        Ok(())
    }

    async fn get_incoming_edges(
        &self,
        node_id: &NodeId,
        board_id: &BoardId,
    ) -> Result<Vec<NodeId>, RepositoryError> {
        let edges = self.edges.lock().await;
        Ok(edges
            .iter()
            .filter(|e| &e.target_node_id == node_id && &e.board_id == board_id)
            .map(|e| e.source_node_id.clone())
            .collect())
    }

    async fn get_nodes_by_ids(&self, ids: &[NodeId]) -> Result<Vec<NodeRecord>, RepositoryError> {
        let nodes = self.nodes.lock().await;
        Ok(ids.iter().filter_map(|id| nodes.get(id).cloned()).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::EntityId;

    fn board(id: &str) -> BoardId {
        BoardId::new(id.to_string()).unwrap()
    }

    fn edge(id: i64, source: i64, target: i64) -> EdgeRecord {
        EdgeRecord {
            id: EntityId::Number(id),
            board_id: board("b1"),
            source_node_id: EntityId::Number(source),
            target_node_id: EntityId::Number(target),
        }
    }

    #[tokio::test]
    async fn test_update_position_success() {
        // テスト項目: 既存ノードの座標を更新できる
        // given (前提条件):
        let repo = InMemoryNodeRepository::new();
        repo.insert_node(NodeRecord::new(EntityId::Number(5), board("b1")))
            .await;

        // when (操作):
        let result = repo
            .update_position(&EntityId::Number(5), &board("b1"), 10.0, 20.0)
            .await;

        // then (期待する結果):
        assert!(result.is_ok());
        let node = repo.get_node(&EntityId::Number(5)).await.unwrap();
        assert_eq!(node.position_x, Some(10.0));
        assert_eq!(node.position_y, Some(20.0));
    }

    #[tokio::test]
    async fn test_update_position_wrong_board_fails() {
        // テスト項目: 別ボードのノードは更新できない
        // given (前提条件):
        let repo = InMemoryNodeRepository::new();
        repo.insert_node(NodeRecord::new(EntityId::Number(5), board("b1")))
            .await;

        // when (操作):
        let result = repo
            .update_position(&EntityId::Number(5), &board("b2"), 1.0, 2.0)
            .await;

        // then (期待する結果):
        assert_eq!(result, Err(RepositoryError::NodeNotFound("5".to_string())));
        let node = repo.get_node(&EntityId::Number(5)).await.unwrap();
        assert_eq!(node.position_x, None);
    }

    #[tokio::test]
    async fn test_get_incoming_edges_and_parents() {
        // テスト項目: 入力エッジの始点ノード ID と、そのノードレコードを取得できる
        // given (前提条件):
        let repo = InMemoryNodeRepository::new();
        for id in [1, 2, 3] {
            repo.insert_node(NodeRecord::new(EntityId::Number(id), board("b1")))
                .await;
        }
        repo.insert_edge(edge(10, 1, 3)).await;
        repo.insert_edge(edge(11, 2, 3)).await;
        repo.insert_edge(edge(12, 3, 1)).await;

        // when (操作):
        let parents = repo
            .get_incoming_edges(&EntityId::Number(3), &board("b1"))
            .await
            .unwrap();
        let records = repo.get_nodes_by_ids(&parents).await.unwrap();

        // then (期待する結果):
        assert_eq!(parents, vec![EntityId::Number(1), EntityId::Number(2)]);
        assert_eq!(records.len(), 2);
    }

    #[tokio::test]
    async fn test_get_nodes_by_ids_skips_unknown() {
        // テスト項目: 存在しない ID は結果から除外される
        // given (前提条件):
        let repo = InMemoryNodeRepository::new();
        repo.insert_node(NodeRecord::new(EntityId::from("a"), board("b1")))
            .await;

        // when (操作):
        let records = repo
            .get_nodes_by_ids(&[EntityId::from("a"), EntityId::from("zzz")])
            .await
            .unwrap();

        // then (期待する結果):
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, EntityId::from("a"));
    }
}
