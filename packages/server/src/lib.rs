//! Real-time collaboration hub for a shared canvas editor.
//!
//! Clients connect to `/ws/{board_id}`; every connection on the same board
//! shares one room, and node/edge/cursor events from one member are fanned
//! out to the others.

pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod ui;
pub mod usecase;

// Re-export entry points
pub use config::ServerConfig;
pub use ui::run as run_server;
