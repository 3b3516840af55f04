//! Infrastructure layer: wire formats and in-memory adapters.

pub mod dto;
pub mod repository;
