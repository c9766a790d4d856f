//! Durable store port for rooms and message history.
//!
//! The store is an external collaborator: the relay only needs a simple
//! create/find/sort contract from it. Writes issued after a broadcast are
//! fire-and-forget from the relay's perspective.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{Message, MessageDraft, MessageValidationError, Room};

/// Errors surfaced by store implementations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backing database failed or returned an unusable row.
    #[error("database failure: {0}")]
    Database(String),

    /// A draft failed the message schema at the storage boundary.
    #[error("invalid message: {0}")]
    InvalidMessage(#[from] MessageValidationError),
}

impl StoreError {
    /// Wraps any displayable backend error as a database failure.
    pub fn database(err: impl std::fmt::Display) -> Self {
        StoreError::Database(err.to_string())
    }
}

/// Port for durable room and message persistence.
///
/// Implementations validate drafts against the message schema; the relay
/// never does. `list_messages` must return history sorted by `created_at`
/// ascending.
#[async_trait]
pub trait ChatStore: Send + Sync {
    /// Create a room with the given name.
    async fn create_room(&self, name: &str) -> Result<Room, StoreError>;

    /// List all rooms in storage order.
    async fn list_rooms(&self) -> Result<Vec<Room>, StoreError>;

    /// Validate and persist one message.
    ///
    /// # Errors
    ///
    /// - `InvalidMessage` if the draft violates the message schema
    /// - `Database` on persistence failure
    async fn create_message(&self, draft: MessageDraft) -> Result<(), StoreError>;

    /// List a room's messages sorted by `created_at` ascending.
    async fn list_messages(&self, room_id: &str) -> Result<Vec<Message>, StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chat_store_is_object_safe() {
        fn assert_object_safe(_store: Option<&dyn ChatStore>) {}
        assert_object_safe(None);
    }

    #[test]
    fn validation_errors_convert_into_store_errors() {
        let err: StoreError = MessageValidationError::MissingType.into();
        assert!(matches!(err, StoreError::InvalidMessage(_)));
    }
}
