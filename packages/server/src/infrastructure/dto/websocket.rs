//! WebSocket message DTOs and the envelope codec.
//!
//! Every frame is a JSON object with a string `type` field. Decoding runs in
//! two phases so the three ways a frame can be wrong stay distinguishable:
//! not an envelope, unknown `type`, or a known `type` with bad fields.

use serde::{Deserialize, Deserializer, Serialize, de::Error as _};
use serde_json::{Map, Number, Value};
use thiserror::Error;

use crate::domain::{BoardId, EdgeId, NodeId, UserId};

/// Message type enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageType {
    NodeMoved,
    NodeCreated,
    NodeUpdated,
    NodeDeleted,
    EdgeCreated,
    EdgeDeleted,
    CursorMoved,
    Disconnect,
    Error,
    UserCountUpdate,
    UserJoined,
    UserLeft,
}

impl MessageType {
    /// Whether clients may send this type
    pub fn is_inbound(self) -> bool {
        !matches!(
            self,
            MessageType::Error
                | MessageType::UserCountUpdate
                | MessageType::UserJoined
                | MessageType::UserLeft
        )
    }
}

/// `node_data` / `edge_data` must carry at least one key
fn non_empty_object<'de, D>(deserializer: D) -> Result<Map<String, Value>, D::Error>
where
    D: Deserializer<'de>,
{
    let object = Map::deserialize(deserializer)?;
    if object.is_empty() {
        return Err(D::Error::custom("object must not be empty"));
    }
    Ok(object)
}

/// Cursor position as sent by a client.
///
/// Fields beyond the required four (display name, color, ...) are carried
/// through to peers untouched. Coordinates keep their JSON number form.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CursorData {
    pub user_id: UserId,
    pub x: Number,
    pub y: Number,
    pub timestamp: Number,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Cursor position as broadcast to peers; coordinates are null on removal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CursorPayload {
    pub user_id: UserId,
    pub x: Option<Number>,
    pub y: Option<Number>,
    pub timestamp: Option<Number>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CursorPayload {
    /// Retraction notice for a departed user's cursor
    pub fn removed(user_id: UserId) -> Self {
        Self {
            user_id,
            x: None,
            y: None,
            timestamp: None,
            extra: Map::new(),
        }
    }
}

impl From<CursorData> for CursorPayload {
    fn from(data: CursorData) -> Self {
        Self {
            user_id: data.user_id,
            x: Some(data.x),
            y: Some(data.y),
            timestamp: Some(data.timestamp),
            extra: data.extra,
        }
    }
}

/// Client → server messages
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    NodeMoved {
        node_id: NodeId,
        x: Number,
        y: Number,
    },
    NodeCreated {
        #[serde(deserialize_with = "non_empty_object")]
        node_data: Map<String, Value>,
    },
    NodeUpdated {
        node_id: NodeId,
        updates: Map<String, Value>,
    },
    NodeDeleted {
        node_id: NodeId,
    },
    EdgeCreated {
        #[serde(deserialize_with = "non_empty_object")]
        edge_data: Map<String, Value>,
    },
    EdgeDeleted {
        edge_id: EdgeId,
    },
    CursorMoved {
        cursor_data: CursorData,
    },
    #[serde(skip)]
    Disconnect,
}

/// Server → client messages
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    NodeMoved {
        node_id: NodeId,
        x: Number,
        y: Number,
    },
    NodeCreated {
        node_data: Map<String, Value>,
    },
    NodeUpdated {
        node_id: NodeId,
        updates: Map<String, Value>,
    },
    NodeDeleted {
        node_id: NodeId,
    },
    EdgeCreated {
        edge_data: Map<String, Value>,
    },
    EdgeDeleted {
        edge_id: EdgeId,
    },
    CursorMoved {
        cursor_data: CursorPayload,
    },
    Error {
        message: String,
    },
    UserCountUpdate {
        board_id: BoardId,
        user_count: usize,
    },
    UserJoined {
        board_id: BoardId,
        user_count: usize,
    },
    UserLeft {
        board_id: BoardId,
        user_count: usize,
    },
}

impl ServerMessage {
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }

    /// Encode as a JSON text frame
    pub fn encode(&self) -> String {
        // every variant is a plain struct of strings, numbers and JSON maps
        serde_json::to_string(self).unwrap_or_else(|e| {
            tracing::error!("Failed to encode server message: {}", e);
            r#"{"type":"error","message":"internal encoding error"}"#.to_string()
        })
    }
}

/// Why an inbound frame could not be turned into a [`ClientMessage`]
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// Not JSON, not an object, or no string `type`
    #[error("{0}")]
    Decode(String),

    /// Well-formed envelope with a `type` this server does not accept
    #[error("Unknown message type: {0}")]
    UnknownKind(String),

    /// Known `type` whose required fields are missing or malformed
    #[error("Invalid `{kind}` message: {reason}")]
    MissingField { kind: String, reason: String },
}

impl ProtocolError {
    /// Sender-only reply for this error, if the protocol calls for one.
    ///
    /// Field errors are dropped silently.
    pub fn notice(&self) -> Option<ServerMessage> {
        match self {
            ProtocolError::Decode(_) | ProtocolError::UnknownKind(_) => {
                Some(ServerMessage::error(self.to_string()))
            }
            ProtocolError::MissingField { .. } => None,
        }
    }
}

/// Decode one text frame into a client message.
pub fn decode(text: &str) -> Result<ClientMessage, ProtocolError> {
    let value: Value =
        serde_json::from_str(text).map_err(|_| ProtocolError::Decode("Invalid JSON".to_string()))?;

    let type_name = match value.get("type") {
        Some(Value::String(t)) => t.clone(),
        _ if !value.is_object() => {
            return Err(ProtocolError::Decode(
                "Message must be a JSON object".to_string(),
            ));
        }
        _ => {
            return Err(ProtocolError::Decode(
                "Message is missing a string `type` field".to_string(),
            ));
        }
    };

    let kind = serde_json::from_value::<MessageType>(Value::String(type_name.clone()))
        .ok()
        .filter(|kind| kind.is_inbound())
        .ok_or_else(|| ProtocolError::UnknownKind(type_name.clone()))?;

    if kind == MessageType::Disconnect {
        return Ok(ClientMessage::Disconnect);
    }

    serde_json::from_value::<ClientMessage>(value).map_err(|e| ProtocolError::MissingField {
        kind: type_name,
        reason: e.to_string(),
    })
}
