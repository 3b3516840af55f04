//! Domain layer error definitions.

use thiserror::Error;

use super::session::SessionState;

/// Errors related to Value Objects validation
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValueObjectError {
    /// BoardId validation error
    #[error("BoardId cannot be empty")]
    BoardIdEmpty,

    /// BoardId too long error
    #[error("BoardId cannot exceed {max} characters (got {actual})")]
    BoardIdTooLong { max: usize, actual: usize },

    /// UserId validation error
    #[error("UserId cannot be empty")]
    UserIdEmpty,

    /// UserId too long error
    #[error("UserId cannot exceed {max} characters (got {actual})")]
    UserIdTooLong { max: usize, actual: usize },

    /// Node / edge identifier validation error
    #[error("EntityId cannot be empty")]
    EntityIdEmpty,
}

/// Errors returned by the persistence collaborator
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("Node not found: {0}")]
    NodeNotFound(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Invalid session state transition
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("Invalid session transition: {from:?} -> {to:?}")]
pub struct SessionError {
    pub from: SessionState,
    pub to: SessionState,
}
