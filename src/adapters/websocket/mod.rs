//! Real-time channel: membership registry, broadcast relay, and the
//! WebSocket connection handler.

pub mod handler;
pub mod messages;
pub mod registry;
pub mod relay;

pub use handler::{websocket_router, ws_handler, RelayState};
pub use messages::{ClientEvent, ServerEvent};
pub use registry::RoomRegistry;
pub use relay::Relay;
