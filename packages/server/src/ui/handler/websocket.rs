//! WebSocket connection handlers.
//!
//! One spawned reader task and one spawned writer task per connection. The
//! session controller below owns the join → receive loop → leave sequence and
//! runs the leave step exactly once however the loop ends.

use std::sync::Arc;

use axum::{
    extract::{
        Path, State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    http::StatusCode,
    response::IntoResponse,
};
use boardsync_shared::time::get_jst_timestamp;
use futures_util::{sink::SinkExt, stream::StreamExt};
use tokio::sync::mpsc;

use crate::{
    domain::{
        BoardId, Connection, ConnectionId, ConnectionIdFactory, Flow, SessionState, Timestamp,
    },
    infrastructure::dto::websocket::ProtocolError,
    ui::state::AppState,
    usecase::{HandleMessageUseCase, JoinBoardUseCase, LeaveBoardUseCase},
};

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    Path(board_id): Path<String>,
) -> Result<impl IntoResponse, StatusCode> {
    // Convert String -> BoardId (Domain Model)
    let board_id = match BoardId::new(board_id) {
        Ok(id) => id,
        Err(e) => {
            tracing::warn!("Rejecting WebSocket upgrade: {}", e);
            return Err(StatusCode::BAD_REQUEST);
        }
    };

    Ok(ws.on_upgrade(move |socket| handle_socket(socket, state, board_id)))
}

/// Apply a state transition, logging instead of failing on an invalid edge.
fn advance(
    current: SessionState,
    next: SessionState,
    connection_id: &ConnectionId,
) -> SessionState {
    match current.transition(next) {
        Ok(state) => {
            tracing::debug!(connection = %connection_id, "Session {:?} -> {:?}", current, state);
            state
        }
        Err(e) => {
            tracing::error!(connection = %connection_id, "{}", e);
            current
        }
    }
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>, board_id: BoardId) {
    let connection_id = ConnectionIdFactory::generate();
    let mut session = SessionState::Connecting;

    let (mut sender, mut receiver) = socket.split();

    // The registry holds the only sender; dropping it (leave / eviction)
    // ends the writer task below.
    let (tx, mut rx) = mpsc::channel::<String>(state.queue_capacity);
    let connection = Connection::new(
        connection_id,
        board_id.clone(),
        tx,
        Timestamp::new(get_jst_timestamp()),
    );

    JoinBoardUseCase::new(state.registry.clone())
        .execute(connection)
        .await;
    session = advance(session, SessionState::Joined, &connection_id);

    // Spawn a task to forward queued messages to this client
    let mut send_task = tokio::spawn(async move {
        while let Some(text) = rx.recv().await {
            if let Err(e) = sender.send(Message::Text(text.into())).await {
                tracing::debug!(connection = %connection_id, "Send failed: {}", e);
                return;
            }
        }
        // queue closed: evicted from the room
        let _ = sender.close().await;
    });

    // Spawn a task to receive messages from this client
    let handler = HandleMessageUseCase::new(state.registry.clone(), state.repository.clone());
    let recv_board_id = board_id.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(frame) = receiver.next().await {
            let frame = match frame {
                Ok(frame) => frame,
                Err(e) => {
                    tracing::warn!(connection = %connection_id, "WebSocket error: {}", e);
                    break;
                }
            };

            match frame {
                Message::Text(text) => {
                    tracing::debug!(connection = %connection_id, "Received text: {}", text.as_str());
                    let flow = handler
                        .execute(&connection_id, &recv_board_id, text.as_str())
                        .await;
                    if flow == Flow::Terminate {
                        break;
                    }
                }
                Message::Binary(_) => {
                    let error = ProtocolError::Decode("Binary frames are not supported".to_string());
                    handler.reject(&connection_id, &error).await;
                }
                Message::Close(_) => {
                    tracing::info!(connection = %connection_id, "Client requested close");
                    break;
                }
                // Ping/pong is handled automatically by the WebSocket protocol
                Message::Ping(_) | Message::Pong(_) => {}
            }
        }
    });

    // If any one of the tasks completes, abort the other
    tokio::select! {
        _ = &mut recv_task => send_task.abort(),
        _ = &mut send_task => recv_task.abort(),
    };
    session = advance(session, SessionState::Terminating, &connection_id);

    LeaveBoardUseCase::new(state.registry.clone())
        .execute(&connection_id)
        .await;
    advance(session, SessionState::Closed, &connection_id);

    tracing::info!(board = %board_id, connection = %connection_id, "Connection closed");
}
