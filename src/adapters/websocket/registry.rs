//! In-memory room membership registry.
//!
//! Tracks which connections belong to which rooms and holds each
//! connection's outbound channel. Membership is many-to-many: a connection
//! can join any number of rooms, and joining does not require the room to
//! exist in durable storage. Unknown rooms are a normal state.
//!
//! # Thread Safety
//!
//! Uses `RwLock` for the registry since broadcasts (reads) vastly outnumber
//! joins and disconnects (writes).

use std::collections::{HashMap, HashSet};

use tokio::sync::mpsc::UnboundedSender;
use tokio::sync::RwLock;

use crate::domain::ConnectionId;

use super::messages::ServerEvent;

/// Registry of live connections and their room memberships.
///
/// Owned exclusively by the relay; no other component mutates membership.
/// No capacity bound is enforced on rooms or members.
pub struct RoomRegistry {
    inner: RwLock<RegistryInner>,
}

#[derive(Default)]
struct RegistryInner {
    /// Map of connection → outbound event channel.
    connections: HashMap<ConnectionId, UnboundedSender<ServerEvent>>,

    /// Map of room id → members in join order.
    rooms: HashMap<String, Vec<ConnectionId>>,

    /// Map of connection → joined rooms, for O(1) cleanup on disconnect.
    memberships: HashMap<ConnectionId, HashSet<String>>,
}

impl RoomRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(RegistryInner::default()),
        }
    }

    /// Record a connection's outbound channel.
    ///
    /// Called once when the connection is established.
    pub async fn register(
        &self,
        connection_id: ConnectionId,
        outbox: UnboundedSender<ServerEvent>,
    ) {
        self.inner
            .write()
            .await
            .connections
            .insert(connection_id, outbox);
    }

    /// Add a connection to a room's member set.
    ///
    /// Idempotent: joining a room twice is not an error and does not change
    /// the member order.
    pub async fn join(&self, connection_id: ConnectionId, room_id: &str) {
        let mut inner = self.inner.write().await;
        let members = inner.rooms.entry(room_id.to_string()).or_default();
        if !members.contains(&connection_id) {
            members.push(connection_id);
        }
        inner
            .memberships
            .entry(connection_id)
            .or_default()
            .insert(room_id.to_string());
    }

    /// Members of a room in join order; empty for unknown rooms.
    pub async fn members_of(&self, room_id: &str) -> Vec<ConnectionId> {
        self.inner
            .read()
            .await
            .rooms
            .get(room_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Push an event onto a member's outbound channel.
    ///
    /// Returns `false` if the connection is gone or its channel is closed.
    pub async fn send_to(&self, connection_id: ConnectionId, event: ServerEvent) -> bool {
        match self.inner.read().await.connections.get(&connection_id) {
            Some(outbox) => outbox.send(event).is_ok(),
            None => false,
        }
    }

    /// Remove a connection from every room it was a member of.
    ///
    /// Called exactly once, on disconnect. Rooms left with no members are
    /// cleaned up.
    pub async fn remove_connection(&self, connection_id: ConnectionId) {
        let mut inner = self.inner.write().await;
        inner.connections.remove(&connection_id);
        let Some(rooms) = inner.memberships.remove(&connection_id) else {
            return;
        };
        for room_id in rooms {
            let emptied = match inner.rooms.get_mut(&room_id) {
                Some(members) => {
                    members.retain(|member| *member != connection_id);
                    members.is_empty()
                }
                None => false,
            };
            if emptied {
                inner.rooms.remove(&room_id);
            }
        }
    }

    /// Get all room ids with at least one member (for monitoring).
    pub async fn active_rooms(&self) -> Vec<String> {
        self.inner.read().await.rooms.keys().cloned().collect()
    }

    /// Total count of live connections.
    pub async fn connection_count(&self) -> usize {
        self.inner.read().await.connections.len()
    }
}

impl Default for RoomRegistry {
    fn default() -> Self {
        Self::new()
    }
}
