//! PostgreSQL implementation of the chat store.
//!
//! Uses sqlx with connection pooling. The tagged message union maps onto
//! nullable columns keyed by `message_type`; rows that do not satisfy their
//! variant's required columns surface as database failures.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::{Message, MessageContent, MessageDraft, Room, RoomId, Timestamp};
use crate::ports::{ChatStore, StoreError};

/// PostgreSQL implementation of the `ChatStore` port.
pub struct PostgresChatStore {
    pool: PgPool,
}

impl PostgresChatStore {
    /// Creates a new store with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Database row representation of a room.
#[derive(Debug, sqlx::FromRow)]
struct RoomRow {
    id: String,
    name: String,
}

impl From<RoomRow> for Room {
    fn from(row: RoomRow) -> Self {
        Room {
            id: RoomId::from_string(row.id),
            name: row.name,
        }
    }
}

/// Database row representation of a message.
#[derive(Debug, sqlx::FromRow)]
struct MessageRow {
    room_id: String,
    user_id: String,
    user_name: String,
    avatar: String,
    message_type: String,
    text: Option<String>,
    team_id: Option<String>,
    team_name: Option<String>,
    team_avatar: Option<String>,
    created_at: DateTime<Utc>,
}

impl TryFrom<MessageRow> for Message {
    type Error = StoreError;

    fn try_from(row: MessageRow) -> Result<Self, Self::Error> {
        let content = match row.message_type.as_str() {
            "text" => MessageContent::Text {
                text: row
                    .text
                    .ok_or_else(|| StoreError::Database("text row without text".to_string()))?,
            },
            "steam" => MessageContent::Steam {
                team_id: row.team_id.ok_or_else(|| {
                    StoreError::Database("steam row without team_id".to_string())
                })?,
                team_name: row.team_name.ok_or_else(|| {
                    StoreError::Database("steam row without team_name".to_string())
                })?,
                team_avatar: row.team_avatar.ok_or_else(|| {
                    StoreError::Database("steam row without team_avatar".to_string())
                })?,
            },
            "smember" => MessageContent::Smember,
            other => {
                return Err(StoreError::Database(format!(
                    "invalid message_type value: {other}"
                )))
            }
        };

        Ok(Message {
            room_id: RoomId::from_string(row.room_id),
            user_id: row.user_id,
            user_name: row.user_name,
            avatar: row.avatar,
            content,
            created_at: Timestamp::from_datetime(row.created_at),
        })
    }
}

#[async_trait]
impl ChatStore for PostgresChatStore {
    async fn create_room(&self, name: &str) -> Result<Room, StoreError> {
        let room = Room::new(name);
        sqlx::query("INSERT INTO rooms (id, name) VALUES ($1, $2)")
            .bind(room.id.as_str())
            .bind(&room.name)
            .execute(&self.pool)
            .await
            .map_err(StoreError::database)?;
        Ok(room)
    }

    async fn list_rooms(&self) -> Result<Vec<Room>, StoreError> {
        let rows: Vec<RoomRow> = sqlx::query_as("SELECT id, name FROM rooms")
            .fetch_all(&self.pool)
            .await
            .map_err(StoreError::database)?;
        Ok(rows.into_iter().map(Room::from).collect())
    }

    async fn create_message(&self, draft: MessageDraft) -> Result<(), StoreError> {
        let message = Message::try_from(draft)?;

        let (text, team_id, team_name, team_avatar) = match &message.content {
            MessageContent::Text { text } => (Some(text.as_str()), None, None, None),
            MessageContent::Steam {
                team_id,
                team_name,
                team_avatar,
            } => (
                None,
                Some(team_id.as_str()),
                Some(team_name.as_str()),
                Some(team_avatar.as_str()),
            ),
            MessageContent::Smember => (None, None, None, None),
        };

        sqlx::query(
            r#"
            INSERT INTO messages (
                id, room_id, user_id, user_name, avatar, message_type,
                text, team_id, team_name, team_avatar, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(message.room_id.as_str())
        .bind(&message.user_id)
        .bind(&message.user_name)
        .bind(&message.avatar)
        .bind(message.content.kind())
        .bind(text)
        .bind(team_id)
        .bind(team_name)
        .bind(team_avatar)
        .bind(message.created_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(StoreError::database)?;

        Ok(())
    }

    async fn list_messages(&self, room_id: &str) -> Result<Vec<Message>, StoreError> {
        let rows: Vec<MessageRow> = sqlx::query_as(
            r#"
            SELECT room_id, user_id, user_name, avatar, message_type,
                   text, team_id, team_name, team_avatar, created_at
            FROM messages
            WHERE room_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(room_id)
        .fetch_all(&self.pool)
        .await
        .map_err(StoreError::database)?;

        rows.into_iter().map(Message::try_from).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(message_type: &str) -> MessageRow {
        MessageRow {
            room_id: "r1".to_string(),
            user_id: "u1".to_string(),
            user_name: "Alice".to_string(),
            avatar: "a.png".to_string(),
            message_type: message_type.to_string(),
            text: None,
            team_id: None,
            team_name: None,
            team_avatar: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn text_row_maps_to_text_content() {
        let message = Message::try_from(MessageRow {
            text: Some("hi".to_string()),
            ..row("text")
        })
        .unwrap();
        assert!(matches!(message.content, MessageContent::Text { ref text } if text == "hi"));
    }

    #[test]
    fn text_row_without_text_is_a_database_error() {
        let result = Message::try_from(row("text"));
        assert!(matches!(result, Err(StoreError::Database(_))));
    }

    #[test]
    fn steam_row_maps_to_steam_content() {
        let message = Message::try_from(MessageRow {
            team_id: Some("t1".to_string()),
            team_name: Some("Reds".to_string()),
            team_avatar: Some("r.png".to_string()),
            ..row("steam")
        })
        .unwrap();
        assert_eq!(message.content.kind(), "steam");
    }

    #[test]
    fn smember_row_needs_no_extra_columns() {
        let message = Message::try_from(row("smember")).unwrap();
        assert_eq!(message.content, MessageContent::Smember);
    }

    #[test]
    fn unknown_message_type_is_a_database_error() {
        let result = Message::try_from(row("gif"));
        assert!(matches!(result, Err(StoreError::Database(_))));
    }
}
