use std::sync::Arc;

use crate::models::{StoredMessage, UserProfile};
use crate::store::IdentityStore;
use crate::websocket::events::NotificationLevel;
use crate::websocket::{chat_group, friends_group, notifications_group, Event, GroupRegistry};

/// Dispatch façade the friend/system/chat domains call to reach connected
/// clients. It is the only write path into the fan-out layer besides the
/// sessions' own pong replies; it never touches domain storage beyond
/// read-only identity lookups used to enrich payloads.
///
/// Every operation is fire-and-forget: a missing user or a failed lookup
/// drops the event with a log line and never surfaces to the caller's
/// business transaction.
pub struct RealtimeService {
    registry: GroupRegistry,
    identities: Arc<dyn IdentityStore>,
}

impl RealtimeService {
    pub fn new(registry: GroupRegistry, identities: Arc<dyn IdentityStore>) -> Self {
        Self {
            registry,
            identities,
        }
    }

    async fn lookup(&self, user_id: i64) -> Option<UserProfile> {
        match self.identities.user_by_id(user_id).await {
            Ok(Some(profile)) => Some(profile),
            Ok(None) => {
                tracing::warn!(user_id, "dropping notification: user no longer exists");
                None
            }
            Err(e) => {
                tracing::warn!(user_id, error = %e, "dropping notification: identity lookup failed");
                None
            }
        }
    }

    /// Notify `receiver_id` that `sender_id` wants to be friends.
    pub async fn send_friend_request_notification(
        &self,
        sender_id: i64,
        receiver_id: i64,
        message: &str,
    ) {
        let Some(sender) = self.lookup(sender_id).await else {
            return;
        };
        let event = Event::FriendRequest {
            sender_id,
            sender_username: sender.username,
            message: message.to_string(),
        };
        self.registry.publish(&friends_group(receiver_id), &event).await;
    }

    /// Notify `user_id` that `friend_id` is now their friend. An acceptance
    /// fires this twice, once per party, each payload naming the other.
    pub async fn send_friend_accepted_notification(&self, friend_id: i64, user_id: i64) {
        let Some(friend) = self.lookup(friend_id).await else {
            return;
        };
        let event = Event::FriendAccepted {
            friend_id,
            friend_username: friend.username,
        };
        self.registry.publish(&friends_group(user_id), &event).await;
    }

    pub async fn send_system_notification(
        &self,
        user_id: i64,
        title: &str,
        message: &str,
        level: NotificationLevel,
    ) {
        let event = Event::SystemNotification {
            user_id,
            title: title.to_string(),
            message: message.to_string(),
            level,
        };
        self.registry
            .publish(&notifications_group(user_id), &event)
            .await;
    }

    /// Room-wide notice, e.g. a member joining or the room being renamed.
    pub async fn send_chat_room_notification(&self, room_id: i64, title: &str, message: &str) {
        let event = Event::ChatNotification {
            title: title.to_string(),
            message: message.to_string(),
        };
        self.registry.publish(&chat_group(room_id), &event).await;
    }

    /// Broadcast a freshly persisted message to its room. Called by the
    /// message-ingestion path immediately after the durable write succeeds,
    /// with the canonical stored form so every subscriber (the sender's other
    /// devices included) sees exactly what was stored.
    pub async fn publish_chat_message(&self, room_id: i64, message: &StoredMessage) {
        self.registry
            .publish(&chat_group(room_id), &Event::chat_message(message))
            .await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::MemoryStore;
    use uuid::Uuid;

    async fn service_with_users(users: &[(i64, &str)]) -> (RealtimeService, GroupRegistry) {
        let registry = GroupRegistry::new(8);
        let store = MemoryStore::new();
        for (id, name) in users {
            store
                .insert_user(UserProfile {
                    id: *id,
                    username: (*name).into(),
                    avatar: None,
                })
                .await;
        }
        (
            RealtimeService::new(registry.clone(), Arc::new(store)),
            registry,
        )
    }

    #[tokio::test]
    async fn friend_request_reaches_receiver_group() {
        let (service, registry) = service_with_users(&[(1, "alice")]).await;
        let mut rx = registry.join(&friends_group(2), Uuid::new_v4()).await;

        service.send_friend_request_notification(1, 2, "hello").await;

        match rx.try_recv().unwrap() {
            Event::FriendRequest {
                sender_id,
                sender_username,
                message,
            } => {
                assert_eq!(sender_id, 1);
                assert_eq!(sender_username, "alice");
                assert_eq!(message, "hello");
            }
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[tokio::test]
    async fn missing_sender_drops_event_silently() {
        let (service, registry) = service_with_users(&[]).await;
        let mut rx = registry.join(&friends_group(2), Uuid::new_v4()).await;

        service.send_friend_request_notification(1, 2, "hello").await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn friend_accepted_names_the_other_party_on_each_side() {
        let (service, registry) = service_with_users(&[(1, "alice"), (2, "bob")]).await;
        let mut rx_sender = registry.join(&friends_group(1), Uuid::new_v4()).await;
        let mut rx_receiver = registry.join(&friends_group(2), Uuid::new_v4()).await;

        // acceptance flow: notify the requester, then the acceptor
        service.send_friend_accepted_notification(2, 1).await;
        service.send_friend_accepted_notification(1, 2).await;

        match rx_sender.try_recv().unwrap() {
            Event::FriendAccepted {
                friend_id,
                friend_username,
            } => {
                assert_eq!(friend_id, 2);
                assert_eq!(friend_username, "bob");
            }
            other => panic!("unexpected event {other:?}"),
        }
        match rx_receiver.try_recv().unwrap() {
            Event::FriendAccepted {
                friend_id,
                friend_username,
            } => {
                assert_eq!(friend_id, 1);
                assert_eq!(friend_username, "alice");
            }
            other => panic!("unexpected event {other:?}"),
        }
        // exactly once each
        assert!(rx_sender.try_recv().is_err());
        assert!(rx_receiver.try_recv().is_err());
    }

    #[tokio::test]
    async fn system_notification_carries_level() {
        let (service, registry) = service_with_users(&[]).await;
        let mut rx = registry
            .join(&notifications_group(7), Uuid::new_v4())
            .await;

        service
            .send_system_notification(7, "upgrade", "done", NotificationLevel::Info)
            .await;

        match rx.try_recv().unwrap() {
            Event::SystemNotification { user_id, level, .. } => {
                assert_eq!(user_id, 7);
                assert_eq!(level, NotificationLevel::Info);
            }
            other => panic!("unexpected event {other:?}"),
        }
    }
}
