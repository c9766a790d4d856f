//! Real-time channel message types.
//!
//! Defines the JSON protocol between the relay and connected clients,
//! tagged by `event`:
//! - Client → Server: `join_room`, `send_msg`, `pong`
//! - Server → Client: `receive_msg`, `ping`

use serde::{Deserialize, Serialize};

use crate::domain::MessageDraft;

/// All events that can be received from a client.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ClientEvent {
    /// Register this connection as a member of a room.
    #[serde(rename_all = "camelCase")]
    JoinRoom { room_id: String },

    /// Broadcast a message to the room named inside the payload.
    SendMsg { message: MessageDraft },

    /// Heartbeat reply; logged only.
    Pong,
}

/// All events that can be sent to a client.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ServerEvent {
    /// A message broadcast to a room this connection is a member of.
    ReceiveMsg { message: MessageDraft },

    /// Liveness probe carrying the current server time.
    Ping { time: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_event_deserializes_join_room() {
        let json = r#"{"event": "join_room", "roomId": "r1"}"#;
        let event: ClientEvent = serde_json::from_str(json).unwrap();
        assert_eq!(
            event,
            ClientEvent::JoinRoom {
                room_id: "r1".to_string()
            }
        );
    }

    #[test]
    fn client_event_deserializes_send_msg() {
        let json = r#"{
            "event": "send_msg",
            "message": {"roomId": "r1", "userId": "u1", "messageType": "text", "text": "hi"}
        }"#;
        let event: ClientEvent = serde_json::from_str(json).unwrap();
        let ClientEvent::SendMsg { message } = event else {
            panic!("expected send_msg");
        };
        assert_eq!(message.room_id, "r1");
        assert_eq!(message.text.as_deref(), Some("hi"));
    }

    #[test]
    fn client_event_deserializes_pong() {
        let json = r#"{"event": "pong"}"#;
        let event: ClientEvent = serde_json::from_str(json).unwrap();
        assert_eq!(event, ClientEvent::Pong);
    }

    #[test]
    fn malformed_client_event_is_an_error() {
        assert!(serde_json::from_str::<ClientEvent>(r#"{"event": "shout"}"#).is_err());
        assert!(serde_json::from_str::<ClientEvent>("not json").is_err());
    }

    #[test]
    fn ping_serializes_with_event_tag() {
        let event = ServerEvent::Ping {
            time: "2025-01-10T00:00:00Z".to_string(),
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains(r#""event":"ping""#));
        assert!(json.contains(r#""time":"2025-01-10T00:00:00Z""#));
    }

    #[test]
    fn receive_msg_carries_the_draft_verbatim() {
        let event = ServerEvent::ReceiveMsg {
            message: MessageDraft {
                room_id: "r1".to_string(),
                user_name: Some("Alice".to_string()),
                message_type: Some("text".to_string()),
                text: Some("hi".to_string()),
                ..Default::default()
            },
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains(r#""event":"receive_msg""#));
        assert!(json.contains(r#""roomId":"r1""#));
        assert!(json.contains(r#""userName":"Alice""#));
    }
}
