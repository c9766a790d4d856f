//! Shared value objects used across the domain.

mod ids;
mod timestamp;

pub use ids::{ConnectionId, RoomId};
pub use timestamp::Timestamp;
