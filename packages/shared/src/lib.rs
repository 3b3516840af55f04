//! Shared utilities for Boardsync binaries and tests.

pub mod logger;
pub mod time;
