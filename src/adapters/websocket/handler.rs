//! WebSocket upgrade handler for the real-time channel.
//!
//! Connection lifecycle:
//! 1. Upgrade to WebSocket and register the connection's outbox
//! 2. Forward broadcasts and heartbeats until either direction closes
//! 3. Remove all memberships exactly once on disconnect

use std::sync::Arc;
use std::time::Duration;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::Response;
use futures::stream::SplitSink;
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;

use crate::domain::{ConnectionId, Timestamp};

use super::messages::{ClientEvent, ServerEvent};
use super::registry::RoomRegistry;
use super::relay::Relay;

/// Interval between liveness probes sent to each connection.
///
/// The reply is logged only; no timeout-based disconnection is derived from
/// it.
const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(10);

/// State required for real-time connection handling.
#[derive(Clone)]
pub struct RelayState {
    pub registry: Arc<RoomRegistry>,
    pub relay: Arc<Relay>,
}

impl RelayState {
    /// Create a new relay state.
    pub fn new(registry: Arc<RoomRegistry>, relay: Arc<Relay>) -> Self {
        Self { registry, relay }
    }
}

/// Handle WebSocket upgrade requests for the real-time channel.
///
/// Route: `GET /ws`
pub async fn ws_handler(State(state): State<RelayState>, ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Handle an established WebSocket connection for its whole lifetime.
async fn handle_socket(socket: WebSocket, state: RelayState) {
    let (mut sender, mut receiver) = socket.split();

    let connection_id = ConnectionId::new();
    let (outbox, mut events) = mpsc::unbounded_channel();
    state.registry.register(connection_id, outbox).await;
    tracing::info!(%connection_id, "client connected");

    // The heartbeat timer lives inside the send task, so its lifetime is
    // exactly the connection's lifetime.
    let mut send_task = tokio::spawn(async move {
        let mut heartbeat = tokio::time::interval(HEARTBEAT_INTERVAL);
        heartbeat.tick().await; // the first tick completes immediately
        loop {
            tokio::select! {
                event = events.recv() => {
                    let Some(event) = event else { break };
                    if send_event(&mut sender, &event).await.is_err() {
                        break;
                    }
                }
                _ = heartbeat.tick() => {
                    let ping = ServerEvent::Ping {
                        time: Timestamp::now().to_rfc3339(),
                    };
                    if send_event(&mut sender, &ping).await.is_err() {
                        break;
                    }
                }
            }
        }
    });

    let registry = Arc::clone(&state.registry);
    let relay = Arc::clone(&state.relay);
    let mut recv_task = tokio::spawn(async move {
        while let Some(frame) = receiver.next().await {
            match frame {
                Ok(Message::Text(text)) => {
                    dispatch_client_event(&registry, &relay, connection_id, &text).await;
                }
                Ok(Message::Close(_)) => {
                    tracing::debug!(%connection_id, "client sent close frame");
                    break;
                }
                // Binary payloads and protocol-level ping/pong are ignored.
                Ok(_) => {}
                Err(err) => {
                    tracing::debug!(%connection_id, error = %err, "receive error");
                    break;
                }
            }
        }
    });

    tokio::select! {
        _ = &mut send_task => recv_task.abort(),
        _ = &mut recv_task => send_task.abort(),
    }

    state.registry.remove_connection(connection_id).await;
    tracing::info!(%connection_id, "client disconnected");
}

/// Route one inbound client event. Malformed events are ignored.
async fn dispatch_client_event(
    registry: &RoomRegistry,
    relay: &Relay,
    connection_id: ConnectionId,
    text: &str,
) {
    match serde_json::from_str::<ClientEvent>(text) {
        Ok(ClientEvent::JoinRoom { room_id }) => {
            registry.join(connection_id, &room_id).await;
            tracing::info!(%connection_id, %room_id, "joined room");
        }
        Ok(ClientEvent::SendMsg { message }) => {
            let room_id = message.room_id.clone();
            relay.broadcast(&room_id, message).await;
        }
        Ok(ClientEvent::Pong) => {
            tracing::debug!(%connection_id, "pong received");
        }
        Err(err) => {
            tracing::debug!(%connection_id, error = %err, "ignoring malformed client event");
        }
    }
}

/// Send a JSON event over the WebSocket.
async fn send_event(
    sender: &mut SplitSink<WebSocket, Message>,
    event: &ServerEvent,
) -> Result<(), axum::Error> {
    let json =
        serde_json::to_string(event).expect("server event serialization should not fail");
    sender.send(Message::Text(json)).await
}

/// Create the axum router for the real-time channel.
pub fn websocket_router() -> axum::Router<RelayState> {
    use axum::routing::get;

    axum::Router::new().route("/ws", get(ws_handler))
}
