//! Collaboration hub server for shared canvas boards.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin boardsync-server -- --port 8000
//! ```

use boardsync_server::ServerConfig;
use boardsync_shared::logger::setup_logger;
use clap::Parser;

#[tokio::main]
async fn main() {
    let config = ServerConfig::parse();

    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), &config.log_level);

    // Run the server
    if let Err(e) = boardsync_server::run_server(config).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
