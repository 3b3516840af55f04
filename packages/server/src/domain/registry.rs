//! Room Registry abstraction.
//!
//! Tracks which connections view which board. Callers never enumerate
//! members; fanout goes through [`RoomRegistry::deliver`], which snapshots
//! the member set and sends outside the lock.

use async_trait::async_trait;

use super::{
    entity::{Connection, Departure},
    value_object::{BoardId, ConnectionId, Timestamp, UserId},
};

/// Outcome of handing one payload to a set of outbound queues
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Delivery {
    /// Number of queues that accepted the payload
    pub delivered: usize,
    /// Connections whose queue was full or closed
    pub failed: Vec<ConnectionId>,
}

impl Delivery {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Builds the first message queued for a new member from the post-join count
pub type Greeting = Box<dyn FnOnce(usize) -> String + Send>;

/// Read-only view of one live room
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomSummary {
    pub board_id: BoardId,
    pub user_count: usize,
    pub created_at: Timestamp,
}

#[async_trait]
pub trait RoomRegistry: Send + Sync {
    /// Register `connection` under its board, creating the room if absent.
    ///
    /// Returns the member count after joining. A connection joins once in
    /// its lifetime; a second join for the same id is ignored.
    async fn join(&self, connection: Connection) -> usize {
        self.join_with_greeting(connection, None).await
    }

    /// Same as [`RoomRegistry::join`], but queues `greeting` on the new
    /// member's sender before any broadcast can reach it.
    async fn join_with_greeting(&self, connection: Connection, greeting: Option<Greeting>) -> usize;

    /// Remove a connection from its room, deleting the room when it empties.
    ///
    /// Returns `None` if the connection is not registered, so concurrent
    /// cleanup paths can call this freely and exactly one of them gets the
    /// [`Departure`].
    async fn leave(&self, connection_id: &ConnectionId) -> Option<Departure>;

    /// Current member count, 0 when the room does not exist
    async fn size(&self, board_id: &BoardId) -> usize;

    /// Record the identity of a registered connection.
    ///
    /// First write wins. Returns `true` only when the identity was stored.
    async fn set_identity(&self, connection_id: &ConnectionId, user_id: UserId) -> bool;

    async fn get_identity(&self, connection_id: &ConnectionId) -> Option<UserId>;

    /// Queue `payload` for every member of the room except `exclude`.
    async fn deliver(
        &self,
        board_id: &BoardId,
        payload: &str,
        exclude: Option<&ConnectionId>,
    ) -> Delivery;

    /// Queue `payload` for a single registered connection
    async fn deliver_to(&self, connection_id: &ConnectionId, payload: &str) -> Delivery;

    /// Snapshot of all live rooms, sorted by board id
    async fn rooms(&self) -> Vec<RoomSummary>;
}
