//! HTTP DTOs for the REST surface.
//!
//! These types define the JSON request/response structure at the HTTP
//! boundary. Message history responses do not echo the room id; the caller
//! already addressed the room in the path.

use serde::{Deserialize, Serialize};

use crate::domain::{Message, MessageContent, MessageDraft, Room};

/// Request to create a room.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateRoomRequest {
    pub name: String,
}

/// A room as returned by the API.
#[derive(Debug, Clone, Serialize)]
pub struct RoomResponse {
    pub id: String,
    pub name: String,
}

impl From<Room> for RoomResponse {
    fn from(room: Room) -> Self {
        Self {
            id: room.id.to_string(),
            name: room.name,
        }
    }
}

/// Request body for posting a message into a room.
///
/// Everything is optional: the payload is forwarded to room members without
/// validation and only checked when it reaches storage.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostMessageRequest {
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub user_name: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub message_type: Option<String>,
    #[serde(default)]
    pub team_id: Option<String>,
    #[serde(default)]
    pub team_name: Option<String>,
    #[serde(default)]
    pub team_avatar: Option<String>,
}

impl PostMessageRequest {
    /// Build a broadcast draft addressed to the room from the request path.
    ///
    /// `created_at` is left unset; the relay assigns it.
    pub fn into_draft(self, room_id: &str) -> MessageDraft {
        MessageDraft {
            room_id: room_id.to_string(),
            user_id: self.user_id,
            user_name: self.user_name,
            text: self.text,
            avatar: self.avatar,
            message_type: self.message_type,
            team_id: self.team_id,
            team_name: self.team_name,
            team_avatar: self.team_avatar,
            created_at: None,
        }
    }
}

/// A message history entry as returned by the API.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageResponse {
    pub user_id: String,
    pub user_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    pub created_at: String,
    pub avatar: String,
    pub message_type: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub team_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub team_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub team_avatar: Option<String>,
}

impl From<Message> for MessageResponse {
    fn from(message: Message) -> Self {
        let message_type = message.content.kind();
        let (text, team_id, team_name, team_avatar) = match message.content {
            MessageContent::Text { text } => (Some(text), None, None, None),
            MessageContent::Steam {
                team_id,
                team_name,
                team_avatar,
            } => (None, Some(team_id), Some(team_name), Some(team_avatar)),
            MessageContent::Smember => (None, None, None, None),
        };

        Self {
            user_id: message.user_id,
            user_name: message.user_name,
            text,
            created_at: message.created_at.to_rfc3339(),
            avatar: message.avatar,
            message_type,
            team_id,
            team_name,
            team_avatar,
        }
    }
}

/// The fixed failure payload: detail stays in the server log.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    /// The generic payload every per-call failure collapses into.
    pub fn internal() -> Self {
        Self {
            error: "Internal server error".to_string(),
        }
    }
}

/// Acknowledgement for message posts, sent regardless of persistence
/// outcome.
#[derive(Debug, Clone, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

impl SuccessResponse {
    pub fn ok() -> Self {
        Self { success: true }
    }
}
