//! Server state shared by every handler.

use std::sync::Arc;

use crate::domain::{NodeRepository, RoomRegistry};

/// Default capacity of each connection's outbound queue
pub const DEFAULT_QUEUE_CAPACITY: usize = 256;

/// Shared application state
pub struct AppState {
    /// Room Registry（接続の所属ボードを管理する唯一の共有状態）
    pub registry: Arc<dyn RoomRegistry>,
    /// 永続化コラボレーター
    pub repository: Arc<dyn NodeRepository>,
    /// Outbound queue capacity per connection
    pub queue_capacity: usize,
}

impl AppState {
    pub fn new(
        registry: Arc<dyn RoomRegistry>,
        repository: Arc<dyn NodeRepository>,
        queue_capacity: usize,
    ) -> Self {
        Self {
            registry,
            repository,
            queue_capacity: queue_capacity.max(1),
        }
    }
}
