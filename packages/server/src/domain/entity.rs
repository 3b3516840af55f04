//! Core domain models for the collaboration hub.

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use super::value_object::{BoardId, ConnectionId, EdgeId, NodeId, Timestamp, UserId};

/// Outbound queue feeding one client's socket writer.
///
/// Bounded so that a stuck client cannot back-pressure the rest of its room.
pub type OutboundSender = mpsc::Sender<String>;

/// One client's live channel, scoped to the board it connected to.
///
/// The board id is fixed at construction and never changes for the lifetime
/// of the connection.
#[derive(Debug, Clone)]
pub struct Connection {
    pub id: ConnectionId,
    pub board_id: BoardId,
    pub sender: OutboundSender,
    pub connected_at: Timestamp,
}

impl Connection {
    /// Create a new connection handle
    pub fn new(
        id: ConnectionId,
        board_id: BoardId,
        sender: OutboundSender,
        connected_at: Timestamp,
    ) -> Self {
        Self {
            id,
            board_id,
            sender,
            connected_at,
        }
    }
}

/// Result of removing a connection from its room.
///
/// Produced once per connection; whoever receives it announces the departure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Departure {
    pub connection_id: ConnectionId,
    pub board_id: BoardId,
    /// Identity the connection had learned before leaving, if any
    pub identity: Option<UserId>,
    /// Member count of the room after the removal
    pub remaining: usize,
}

/// A node as stored by the persistence collaborator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
    pub id: NodeId,
    pub board_id: BoardId,
    pub title: Option<String>,
    pub prompt: Option<String>,
    pub response: Option<String>,
    pub context: Option<String>,
    pub position_x: Option<f64>,
    pub position_y: Option<f64>,
}

impl NodeRecord {
    /// Create a node with no content and no position
    pub fn new(id: NodeId, board_id: BoardId) -> Self {
        Self {
            id,
            board_id,
            title: None,
            prompt: None,
            response: None,
            context: None,
            position_x: None,
            position_y: None,
        }
    }
}

/// A directed edge between two nodes on the same board
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeRecord {
    pub id: EdgeId,
    pub board_id: BoardId,
    pub source_node_id: NodeId,
    pub target_node_id: NodeId,
}
