//! HTTP API endpoint handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use boardsync_shared::time::timestamp_to_jst_rfc3339;

use crate::{
    domain::{BoardId, RoomSummary},
    infrastructure::dto::http::BoardRoomDto,
    ui::state::AppState,
};

fn to_dto(room: RoomSummary) -> BoardRoomDto {
    BoardRoomDto {
        board_id: room.board_id.as_str().to_string(),
        user_count: room.user_count,
        created_at: timestamp_to_jst_rfc3339(room.created_at.value()),
    }
}

/// Health check endpoint
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// Get list of boards that currently have live connections
pub async fn get_boards(State(state): State<Arc<AppState>>) -> Json<Vec<BoardRoomDto>> {
    let rooms = state.registry.rooms().await;
    Json(rooms.into_iter().map(to_dto).collect())
}

/// Get the live room of one board
pub async fn get_board_detail(
    State(state): State<Arc<AppState>>,
    Path(board_id): Path<String>,
) -> Result<Json<BoardRoomDto>, StatusCode> {
    let board_id = BoardId::new(board_id).map_err(|_| StatusCode::NOT_FOUND)?;

    state
        .registry
        .rooms()
        .await
        .into_iter()
        .find(|room| room.board_id == board_id)
        .map(|room| Json(to_dto(room)))
        .ok_or(StatusCode::NOT_FOUND)
}
