//! Persistence collaborator interface.
//!
//! The hub only writes node positions; the read side exists for callers that
//! walk a node's parents.

use async_trait::async_trait;

use super::{
    entity::NodeRecord,
    error::RepositoryError,
    value_object::{BoardId, NodeId},
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NodeRepository: Send + Sync {
    /// Persist new coordinates for a node on a board
    async fn update_position(
        &self,
        node_id: &NodeId,
        board_id: &BoardId,
        x: f64,
        y: f64,
    ) -> Result<(), RepositoryError>;

    /// Source node ids of every edge that targets `node_id`
    async fn get_incoming_edges(
        &self,
        node_id: &NodeId,
        board_id: &BoardId,
    ) -> Result<Vec<NodeId>, RepositoryError>;

    /// Fetch the nodes with the given ids; unknown ids are skipped
    async fn get_nodes_by_ids(&self, ids: &[NodeId]) -> Result<Vec<NodeRecord>, RepositoryError>;
}
