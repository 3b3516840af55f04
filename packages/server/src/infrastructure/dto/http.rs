//! HTTP API response DTOs for the collaboration hub.

use serde::{Deserialize, Serialize};

/// Live room summary for the board list / detail endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardRoomDto {
    pub board_id: String,
    pub user_count: usize,
    pub created_at: String, // ISO 8601
}
