//! Route table.

use std::sync::Arc;

use axum::{Router, routing::get};
use tower_http::trace::TraceLayer;

use super::{
    handler::{get_board_detail, get_boards, health_check, websocket_handler},
    state::AppState,
};

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/ws/{board_id}", get(websocket_handler))
        .route("/api/health", get(health_check))
        .route("/api/boards", get(get_boards))
        .route("/api/boards/{board_id}", get(get_board_detail))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
