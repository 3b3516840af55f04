//! Domain layer for the collaboration hub.
//!
//! This module contains business logic that is independent of
//! data transfer objects (DTOs) and infrastructure concerns.

pub mod entity;
pub mod error;
pub mod factory;
pub mod registry;
pub mod repository;
pub mod session;
pub mod value_object;

pub use entity::{Connection, Departure, EdgeRecord, NodeRecord, OutboundSender};
pub use error::{RepositoryError, SessionError, ValueObjectError};
pub use factory::ConnectionIdFactory;
pub use registry::{Delivery, Greeting, RoomRegistry, RoomSummary};
pub use repository::NodeRepository;
pub use session::{Flow, SessionState};
pub use value_object::{BoardId, ConnectionId, EdgeId, EntityId, NodeId, Timestamp, UserId};
