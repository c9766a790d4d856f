//! Broadcast core: room fan-out with decoupled durable persistence.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::domain::{MessageDraft, Timestamp};
use crate::ports::ChatStore;

use super::messages::ServerEvent;
use super::registry::RoomRegistry;

/// Fans messages out to room members and submits them for durable storage.
///
/// Delivery and persistence are decoupled: every current member receives the
/// message before the durable write is even submitted, and a failed write
/// never fails or retries the broadcast. Payloads are forwarded verbatim;
/// schema validation happens at the storage boundary, after delivery.
pub struct Relay {
    registry: Arc<RoomRegistry>,
    store: Arc<dyn ChatStore>,

    /// Count of persistence failures, observable without ever surfacing on
    /// the real-time path.
    persist_failures: Arc<AtomicU64>,
}

impl Relay {
    /// Creates a relay over the given registry and store.
    pub fn new(registry: Arc<RoomRegistry>, store: Arc<dyn ChatStore>) -> Self {
        Self {
            registry,
            store,
            persist_failures: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Broadcast a message to every member of a room, then submit it for
    /// durable storage on a detached task.
    ///
    /// Members are delivered to in registration order. Broadcasting to a
    /// room with no members is not an error; the message is still persisted.
    /// Returns the number of members the message was delivered to.
    pub async fn broadcast(&self, room_id: &str, mut draft: MessageDraft) -> usize {
        draft.room_id = room_id.to_string();
        if draft.created_at.is_none() {
            draft.created_at = Some(Timestamp::now());
        }

        let event = ServerEvent::ReceiveMsg {
            message: draft.clone(),
        };
        let members = self.registry.members_of(room_id).await;
        let mut delivered = 0;
        for member in members {
            if self.registry.send_to(member, event.clone()).await {
                delivered += 1;
            }
        }

        let store = Arc::clone(&self.store);
        let failures = Arc::clone(&self.persist_failures);
        let room = draft.room_id.clone();
        tokio::spawn(async move {
            if let Err(err) = store.create_message(draft).await {
                failures.fetch_add(1, Ordering::Relaxed);
                tracing::error!(room_id = %room, error = %err, "failed to persist broadcast message");
            }
        });

        delivered
    }

    /// Number of durable writes that have failed since startup.
    pub fn persist_failures(&self) -> u64 {
        self.persist_failures.load(Ordering::Relaxed)
    }
}
