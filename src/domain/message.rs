//! Message entity and the permissive wire record it is validated from.
//!
//! The relay forwards `MessageDraft` payloads verbatim; conditionally
//! required fields are only enforced when a draft crosses the storage
//! boundary and becomes a `Message`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::foundation::{RoomId, Timestamp};

/// Variant payload of a message, keyed by `messageType` on the wire.
///
/// Each variant's required fields are enforced by the type system instead of
/// runtime conditionals on a discriminator string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "messageType", rename_all = "lowercase")]
pub enum MessageContent {
    /// Plain chat text.
    #[serde(rename_all = "camelCase")]
    Text { text: String },

    /// A team announcement carrying the team's identity.
    #[serde(rename_all = "camelCase")]
    Steam {
        team_id: String,
        team_name: String,
        team_avatar: String,
    },

    /// A team membership notice; carries no extra payload.
    Smember,
}

impl MessageContent {
    /// The wire value of `messageType` for this variant.
    pub fn kind(&self) -> &'static str {
        match self {
            MessageContent::Text { .. } => "text",
            MessageContent::Steam { .. } => "steam",
            MessageContent::Smember => "smember",
        }
    }
}

/// A validated, immutable chat message as stored and returned from history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub room_id: RoomId,
    pub user_id: String,
    pub user_name: String,
    pub avatar: String,
    #[serde(flatten)]
    pub content: MessageContent,
    pub created_at: Timestamp,
}

/// The permissive message record accepted from senders.
///
/// Everything beyond the routing key is optional so that arbitrary payloads
/// can be fanned out to room members; a draft that would violate the message
/// schema only fails later, at the storage boundary.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageDraft {
    #[serde(default)]
    pub room_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team_avatar: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<Timestamp>,
}

/// Errors raised when a draft fails the message schema.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MessageValidationError {
    #[error("field '{0}' is required")]
    MissingField(&'static str),

    #[error("message type is required")]
    MissingType,

    #[error("unknown message type '{0}'")]
    UnknownType(String),

    #[error("field '{field}' is required when messageType is '{message_type}'")]
    MissingConditional {
        field: &'static str,
        message_type: &'static str,
    },
}

fn required(
    value: Option<String>,
    field: &'static str,
) -> Result<String, MessageValidationError> {
    match value {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(MessageValidationError::MissingField(field)),
    }
}

fn conditional(
    value: Option<String>,
    field: &'static str,
    message_type: &'static str,
) -> Result<String, MessageValidationError> {
    match value {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(MessageValidationError::MissingConditional {
            field,
            message_type,
        }),
    }
}

impl TryFrom<MessageDraft> for Message {
    type Error = MessageValidationError;

    fn try_from(draft: MessageDraft) -> Result<Self, Self::Error> {
        if draft.room_id.is_empty() {
            return Err(MessageValidationError::MissingField("roomId"));
        }

        let message_type = draft
            .message_type
            .filter(|t| !t.is_empty())
            .ok_or(MessageValidationError::MissingType)?;

        let content = match message_type.as_str() {
            "text" => MessageContent::Text {
                text: conditional(draft.text, "text", "text")?,
            },
            "steam" => MessageContent::Steam {
                team_id: conditional(draft.team_id, "teamId", "steam")?,
                team_name: conditional(draft.team_name, "teamName", "steam")?,
                team_avatar: conditional(draft.team_avatar, "teamAvatar", "steam")?,
            },
            "smember" => MessageContent::Smember,
            other => return Err(MessageValidationError::UnknownType(other.to_string())),
        };

        Ok(Message {
            room_id: RoomId::from_string(draft.room_id),
            user_id: required(draft.user_id, "userId")?,
            user_name: required(draft.user_name, "userName")?,
            avatar: required(draft.avatar, "avatar")?,
            content,
            created_at: draft.created_at.unwrap_or_else(Timestamp::now),
        })
    }
}
