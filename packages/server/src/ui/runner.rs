//! Server startup.

use std::sync::Arc;

use tokio::net::TcpListener;

use crate::{
    config::ServerConfig,
    error::ServerError,
    infrastructure::repository::{InMemoryNodeRepository, InMemoryRoomRegistry},
};

use super::{router::create_router, signal::shutdown_signal, state::AppState};

/// Bind the configured address and serve until a shutdown signal arrives.
pub async fn run(config: ServerConfig) -> Result<(), ServerError> {
    let state = Arc::new(AppState::new(
        Arc::new(InMemoryRoomRegistry::new()),
        Arc::new(InMemoryNodeRepository::new()),
        config.queue_capacity,
    ));

    let addr = config.bind_address();
    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|source| ServerError::Bind { addr, source })?;

    serve(listener, state).await
}

/// Serve on an already-bound listener.
pub async fn serve(listener: TcpListener, state: Arc<AppState>) -> Result<(), ServerError> {
    let local_addr = listener.local_addr()?;
    tracing::info!("Listening on {}", local_addr);
    tracing::info!("WebSocket endpoint: ws://{}/ws/{{board_id}}", local_addr);

    axum::serve(listener, create_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}
