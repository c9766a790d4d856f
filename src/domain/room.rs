//! Room entity.

use serde::{Deserialize, Serialize};

use super::foundation::RoomId;

/// A named chat room.
///
/// Created once through the REST API and immutable afterwards; the relay
/// never deletes rooms. Broadcast does not require a room to exist here:
/// membership is tracked purely in-memory by identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    pub id: RoomId,
    pub name: String,
}

impl Room {
    /// Creates a room with a fresh identifier.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: RoomId::new(),
            name: name.into(),
        }
    }
}
