//! In-memory implementation of the chat store.
//!
//! Backs tests and local experimentation; applies the same storage-boundary
//! validation as the real store.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::{Message, MessageDraft, Room};
use crate::ports::{ChatStore, StoreError};

/// Chat store holding rooms and messages in process memory.
pub struct InMemoryChatStore {
    rooms: Mutex<Vec<Room>>,
    messages: Mutex<Vec<Message>>,
}

impl InMemoryChatStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self {
            rooms: Mutex::new(Vec::new()),
            messages: Mutex::new(Vec::new()),
        }
    }
}

impl Default for InMemoryChatStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ChatStore for InMemoryChatStore {
    async fn create_room(&self, name: &str) -> Result<Room, StoreError> {
        let room = Room::new(name);
        self.rooms
            .lock()
            .map_err(StoreError::database)?
            .push(room.clone());
        Ok(room)
    }

    async fn list_rooms(&self) -> Result<Vec<Room>, StoreError> {
        Ok(self.rooms.lock().map_err(StoreError::database)?.clone())
    }

    async fn create_message(&self, draft: MessageDraft) -> Result<(), StoreError> {
        let message = Message::try_from(draft)?;
        self.messages
            .lock()
            .map_err(StoreError::database)?
            .push(message);
        Ok(())
    }

    async fn list_messages(&self, room_id: &str) -> Result<Vec<Message>, StoreError> {
        let mut history: Vec<Message> = self
            .messages
            .lock()
            .map_err(StoreError::database)?
            .iter()
            .filter(|message| message.room_id.as_str() == room_id)
            .cloned()
            .collect();
        history.sort_by_key(|message| message.created_at);
        Ok(history)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{MessageContent, Timestamp};
    use chrono::{TimeZone, Utc};

    fn draft(room_id: &str, text: &str, created_at: Option<Timestamp>) -> MessageDraft {
        MessageDraft {
            room_id: room_id.to_string(),
            user_id: Some("u1".to_string()),
            user_name: Some("Alice".to_string()),
            text: Some(text.to_string()),
            avatar: Some("a.png".to_string()),
            message_type: Some("text".to_string()),
            created_at,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn created_rooms_are_listed_in_insertion_order() {
        let store = InMemoryChatStore::new();
        store.create_room("general").await.unwrap();
        store.create_room("random").await.unwrap();

        let rooms = store.list_rooms().await.unwrap();
        assert_eq!(rooms.len(), 2);
        assert_eq!(rooms[0].name, "general");
        assert_eq!(rooms[1].name, "random");
    }

    #[tokio::test]
    async fn messages_are_sorted_by_created_at_ascending() {
        let store = InMemoryChatStore::new();
        let earlier = Timestamp::from_datetime(Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap());
        let later = Timestamp::from_datetime(Utc.with_ymd_and_hms(2025, 1, 2, 0, 0, 0).unwrap());

        store
            .create_message(draft("r1", "second", Some(later)))
            .await
            .unwrap();
        store
            .create_message(draft("r1", "first", Some(earlier)))
            .await
            .unwrap();

        let history = store.list_messages("r1").await.unwrap();
        assert_eq!(history.len(), 2);
        assert!(matches!(&history[0].content, MessageContent::Text { text } if text == "first"));
        assert!(matches!(&history[1].content, MessageContent::Text { text } if text == "second"));
    }

    #[tokio::test]
    async fn messages_are_scoped_to_their_room() {
        let store = InMemoryChatStore::new();
        store.create_message(draft("r1", "one", None)).await.unwrap();
        store.create_message(draft("r2", "two", None)).await.unwrap();

        assert_eq!(store.list_messages("r1").await.unwrap().len(), 1);
        assert_eq!(store.list_messages("r2").await.unwrap().len(), 1);
        assert!(store.list_messages("r3").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn invalid_draft_is_rejected_at_the_storage_boundary() {
        let store = InMemoryChatStore::new();
        let invalid = MessageDraft {
            text: None,
            ..draft("r1", "hi", None)
        };

        let result = store.create_message(invalid).await;
        assert!(matches!(result, Err(StoreError::InvalidMessage(_))));
        assert!(store.list_messages("r1").await.unwrap().is_empty());
    }
}
