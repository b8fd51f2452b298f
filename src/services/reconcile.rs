use std::sync::Arc;

use crate::error::AppError;
use crate::store::{MessageStore, ReadCursorStore};
use crate::websocket::Event;

/// Computes the backlog a user missed in a room since their read cursor.
/// Runs once per chat connection, before live delivery begins; it never
/// advances the cursor itself, since marking read is an explicit client
/// action.
pub struct UnreadReconciler {
    messages: Arc<dyn MessageStore>,
    cursors: Arc<dyn ReadCursorStore>,
}

impl UnreadReconciler {
    pub fn new(messages: Arc<dyn MessageStore>, cursors: Arc<dyn ReadCursorStore>) -> Self {
        Self { messages, cursors }
    }

    /// Messages in `room_id` with id beyond the user's cursor (0 if none),
    /// excluding their own, ascending by id, in the same event shape as live
    /// delivery.
    pub async fn reconcile(&self, room_id: i64, user_id: i64) -> Result<Vec<Event>, AppError> {
        let cursor = self
            .cursors
            .last_read(room_id, user_id)
            .await?
            .unwrap_or(0);
        let backlog = self
            .messages
            .messages_after(room_id, cursor, user_id)
            .await?;
        Ok(backlog.iter().map(Event::chat_message).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MessageKind, NewMessage, UserProfile};
    use crate::store::memory::MemoryStore;

    async fn seeded_store() -> Arc<MemoryStore> {
        let store = Arc::new(MemoryStore::new());
        for (id, name) in [(1, "alice"), (2, "bob")] {
            store
                .insert_user(UserProfile {
                    id,
                    username: name.into(),
                    avatar: None,
                })
                .await;
        }
        store
    }

    async fn send(store: &MemoryStore, room_id: i64, sender_id: i64, content: &str) -> i64 {
        store
            .create_message(NewMessage {
                room_type: "private".into(),
                room_id,
                sender_id,
                kind: MessageKind::Text,
                content: Some(content.into()),
                file: None,
                filename: None,
            })
            .await
            .unwrap()
            .id
    }

    #[tokio::test]
    async fn replays_everything_past_the_cursor_in_order() {
        let store = seeded_store().await;
        let first = send(&store, 42, 2, "one").await;
        let second = send(&store, 42, 2, "two").await;
        let third = send(&store, 42, 2, "three").await;

        store.mark_read(42, 1, first).await.unwrap();
        let reconciler = UnreadReconciler::new(store.clone(), store.clone());
        let backlog = reconciler.reconcile(42, 1).await.unwrap();

        let ids: Vec<i64> = backlog
            .iter()
            .map(|event| match event {
                Event::ChatMessage { id, .. } => *id,
                other => panic!("unexpected event {other:?}"),
            })
            .collect();
        assert_eq!(ids, vec![second, third]);
    }

    #[tokio::test]
    async fn missing_cursor_defaults_to_zero() {
        let store = seeded_store().await;
        send(&store, 42, 2, "one").await;
        send(&store, 42, 2, "two").await;

        let reconciler = UnreadReconciler::new(store.clone(), store.clone());
        assert_eq!(reconciler.reconcile(42, 1).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn own_messages_are_not_replayed() {
        let store = seeded_store().await;
        send(&store, 42, 1, "mine").await;
        send(&store, 42, 2, "theirs").await;

        let reconciler = UnreadReconciler::new(store.clone(), store.clone());
        let backlog = reconciler.reconcile(42, 1).await.unwrap();
        assert_eq!(backlog.len(), 1);
    }

    #[tokio::test]
    async fn reconcile_does_not_advance_the_cursor() {
        let store = seeded_store().await;
        send(&store, 42, 2, "one").await;

        let reconciler = UnreadReconciler::new(store.clone(), store.clone());
        reconciler.reconcile(42, 1).await.unwrap();
        assert_eq!(store.last_read(42, 1).await.unwrap(), None);
    }
}
