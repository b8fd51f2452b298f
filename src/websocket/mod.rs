use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::mpsc::{self, error::TrySendError, Receiver, Sender};
use tokio::sync::RwLock;
use uuid::Uuid;

pub mod events;
pub mod handlers;
pub mod session;

pub use events::Event;

/// Fan-out group for a chat room.
pub fn chat_group(room_id: i64) -> String {
    format!("chat_{room_id}")
}

/// Fan-out group carrying a user's friend-relationship events.
pub fn friends_group(user_id: i64) -> String {
    format!("friends_{user_id}")
}

/// Fan-out group carrying a user's system notifications.
pub fn notifications_group(user_id: i64) -> String {
    format!("notifications_{user_id}")
}

struct Subscriber {
    session_id: Uuid,
    tx: Sender<Event>,
}

/// Maps group names to the sessions currently subscribed to them. Membership
/// is volatile: it exists only while connections are open and is rebuilt from
/// nothing on restart, the durable store being the source of truth.
///
/// Delivery is fire-and-forget per subscriber through a bounded queue; a
/// subscriber whose queue is full or closed is evicted so it can never stall
/// the publisher or its siblings.
#[derive(Clone)]
pub struct GroupRegistry {
    inner: Arc<RwLock<HashMap<String, Vec<Subscriber>>>>,
    send_queue: usize,
}

impl GroupRegistry {
    pub fn new(send_queue: usize) -> Self {
        Self {
            inner: Arc::new(RwLock::new(HashMap::new())),
            send_queue,
        }
    }

    /// Add a session to a group and hand back its delivery queue. Idempotent
    /// per session id: re-joining replaces the previous subscription, so a
    /// group never holds two entries for the same connection.
    pub async fn join(&self, group: &str, session_id: Uuid) -> Receiver<Event> {
        let (tx, rx) = mpsc::channel(self.send_queue);
        let mut guard = self.inner.write().await;
        let subscribers = guard.entry(group.to_string()).or_default();
        subscribers.retain(|s| s.session_id != session_id);
        subscribers.push(Subscriber { session_id, tx });
        rx
    }

    /// Remove a session from a group; no-op if it was never subscribed.
    pub async fn leave(&self, group: &str, session_id: Uuid) {
        let mut guard = self.inner.write().await;
        if let Some(subscribers) = guard.get_mut(group) {
            subscribers.retain(|s| s.session_id != session_id);
            if subscribers.is_empty() {
                guard.remove(group);
            }
        }
    }

    /// Deliver an event to every current subscriber of a group, in join
    /// order. Best-effort: a full or closed queue drops that subscriber
    /// without affecting the others. Unknown or empty groups are a no-op.
    pub async fn publish(&self, group: &str, event: &Event) {
        let mut guard = self.inner.write().await;
        let Some(subscribers) = guard.get_mut(group) else {
            return;
        };
        crate::metrics::EVENTS_PUBLISHED_TOTAL
            .with_label_values(&[event.kind()])
            .inc();
        subscribers.retain(|s| match s.tx.try_send(event.clone()) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) | Err(TrySendError::Closed(_)) => {
                tracing::warn!(group, session_id = %s.session_id, "dropping unresponsive subscriber");
                false
            }
        });
        if subscribers.is_empty() {
            guard.remove(group);
        }
    }

    pub async fn subscriber_count(&self, group: &str) -> usize {
        let guard = self.inner.read().await;
        guard.get(group).map(|s| s.len()).unwrap_or(0)
    }
}
