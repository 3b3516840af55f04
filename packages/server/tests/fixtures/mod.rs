//! Test fixtures: an in-process server on an ephemeral port.

#![allow(dead_code)]

use std::{net::SocketAddr, sync::Arc, time::Duration};

use boardsync_server::{
    infrastructure::repository::{InMemoryNodeRepository, InMemoryRoomRegistry},
    ui::{serve, state::AppState},
};
use futures_util::{SinkExt, StreamExt};
use serde_json::Value;
use tokio::{net::TcpListener, task::JoinHandle};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async, tungstenite::Message};

pub type WsClient = WebSocketStream<MaybeTlsStream<tokio::net::TcpStream>>;

/// How long to wait for a message that should arrive
const RECV_TIMEOUT: Duration = Duration::from_secs(3);

/// How long to wait before concluding that nothing will arrive
const SILENCE_WINDOW: Duration = Duration::from_millis(200);

pub struct TestServer {
    addr: SocketAddr,
    handle: JoinHandle<()>,
    pub nodes: Arc<InMemoryNodeRepository>,
}

impl TestServer {
    pub async fn start() -> Self {
        Self::start_with_capacity(64).await
    }

    pub async fn start_with_capacity(queue_capacity: usize) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let addr = listener.local_addr().expect("Failed to read local addr");

        let nodes = Arc::new(InMemoryNodeRepository::new());
        let state = Arc::new(AppState::new(
            Arc::new(InMemoryRoomRegistry::new()),
            nodes.clone(),
            queue_capacity,
        ));

        let handle = tokio::spawn(async move {
            if let Err(e) = serve(listener, state).await {
                eprintln!("Test server error: {e}");
            }
        });

        Self {
            addr,
            handle,
            nodes,
        }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn ws_url(&self, board_id: &str) -> String {
        format!("ws://{}/ws/{}", self.addr, board_id)
    }

    /// Connect to a board and consume the initial `user_count_update`.
    pub async fn join(&self, board_id: &str) -> (WsClient, Value) {
        let (mut ws, _) = connect_async(self.ws_url(board_id))
            .await
            .expect("Failed to connect WebSocket");
        let greeting = recv_json(&mut ws).await;
        assert_eq!(greeting["type"], "user_count_update");
        (ws, greeting)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

pub async fn send_json(ws: &mut WsClient, value: &Value) {
    ws.send(Message::Text(value.to_string().into()))
        .await
        .expect("Failed to send message");
}

pub async fn send_text(ws: &mut WsClient, text: &str) {
    ws.send(Message::Text(text.to_string().into()))
        .await
        .expect("Failed to send message");
}

/// Next text frame as JSON, skipping control frames.
pub async fn recv_json(ws: &mut WsClient) -> Value {
    loop {
        let frame = tokio::time::timeout(RECV_TIMEOUT, ws.next())
            .await
            .expect("Timed out waiting for a message")
            .expect("Stream ended while waiting for a message")
            .expect("WebSocket error while waiting for a message");
        match frame {
            Message::Text(text) => {
                return serde_json::from_str(text.as_str()).expect("Server sent invalid JSON");
            }
            Message::Close(_) => panic!("Connection closed while waiting for a message"),
            _ => continue,
        }
    }
}

/// Assert that no text frame arrives within the silence window.
pub async fn assert_silent(ws: &mut WsClient) {
    if let Ok(Some(Ok(Message::Text(text)))) = tokio::time::timeout(SILENCE_WINDOW, ws.next()).await {
        panic!("Expected no message, got: {}", text.as_str());
    }
}

/// Wait until the server closes this connection.
pub async fn expect_closed(ws: &mut WsClient) {
    loop {
        match tokio::time::timeout(RECV_TIMEOUT, ws.next())
            .await
            .expect("Timed out waiting for the server to close")
        {
            None | Some(Err(_)) | Some(Ok(Message::Close(_))) => return,
            Some(Ok(_)) => continue,
        }
    }
}
