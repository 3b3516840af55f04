//! Per-connection protocol state.
//!
//! ```text
//! Connecting -> Joined -> Terminating -> Closed
//!      \______________________^
//! ```

use super::error::SessionError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Socket accepted, not yet registered in a room
    Connecting,
    /// Registered; the receive loop is running
    Joined,
    /// Receive loop ended; leave-and-notify pending
    Terminating,
    /// Left the room and announced
    Closed,
}

impl SessionState {
    /// Move to `next`, rejecting anything but the forward edges above.
    pub fn transition(self, next: SessionState) -> Result<SessionState, SessionError> {
        use SessionState::*;

        match (self, next) {
            (Connecting, Joined)
            | (Connecting, Terminating)
            | (Joined, Terminating)
            | (Terminating, Closed) => Ok(next),
            (from, to) => Err(SessionError { from, to }),
        }
    }
}

/// Outcome of handling one inbound frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Stay in `Joined` and read the next frame
    Continue,
    /// Client asked to leave; move to `Terminating`
    Terminate,
}
