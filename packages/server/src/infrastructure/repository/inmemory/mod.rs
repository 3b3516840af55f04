mod node;
mod room;

pub use node::InMemoryNodeRepository;
pub use room::InMemoryRoomRegistry;
