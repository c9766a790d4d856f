//! Domain entities and value objects.

pub mod foundation;
pub mod message;
pub mod room;

pub use foundation::{ConnectionId, RoomId, Timestamp};
pub use message::{Message, MessageContent, MessageDraft, MessageValidationError};
pub use room::Room;
