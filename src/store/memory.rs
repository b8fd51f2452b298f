use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;

use crate::error::AppError;
use crate::models::{NewMessage, StoredMessage, UserProfile};

use super::{IdentityStore, MessageStore, ReadCursorStore};

#[derive(Default)]
struct Inner {
    users: HashMap<i64, UserProfile>,
    messages: Vec<StoredMessage>,
    cursors: HashMap<(i64, i64), i64>,
    next_message_id: i64,
}

/// In-memory implementation of every store port. Ids are assigned from a
/// single counter so they are strictly increasing, same as the relational
/// store's sequence.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_user(&self, profile: UserProfile) {
        let mut inner = self.inner.lock().await;
        inner.users.insert(profile.id, profile);
    }
}

#[async_trait]
impl IdentityStore for MemoryStore {
    async fn user_by_id(&self, user_id: i64) -> Result<Option<UserProfile>, AppError> {
        let inner = self.inner.lock().await;
        Ok(inner.users.get(&user_id).cloned())
    }
}

#[async_trait]
impl MessageStore for MemoryStore {
    async fn create_message(&self, new: NewMessage) -> Result<StoredMessage, AppError> {
        let mut inner = self.inner.lock().await;
        let sender = inner
            .users
            .get(&new.sender_id)
            .cloned()
            .ok_or(AppError::NotFound)?;
        inner.next_message_id += 1;
        let message = StoredMessage {
            id: inner.next_message_id,
            sender,
            timestamp: Utc::now(),
            room_type: new.room_type,
            room_id: new.room_id,
            kind: new.kind,
            content: new.content,
            file: new.file,
            filename: new.filename,
        };
        inner.messages.push(message.clone());
        Ok(message)
    }

    async fn message_by_id(&self, message_id: i64) -> Result<Option<StoredMessage>, AppError> {
        let inner = self.inner.lock().await;
        Ok(inner.messages.iter().find(|m| m.id == message_id).cloned())
    }

    async fn messages_after(
        &self,
        room_id: i64,
        after_id: i64,
        exclude_sender: i64,
    ) -> Result<Vec<StoredMessage>, AppError> {
        let inner = self.inner.lock().await;
        let mut messages: Vec<StoredMessage> = inner
            .messages
            .iter()
            .filter(|m| m.room_id == room_id && m.id > after_id && m.sender.id != exclude_sender)
            .cloned()
            .collect();
        messages.sort_by_key(|m| m.id);
        Ok(messages)
    }

    async fn count_after(
        &self,
        room_id: i64,
        after_id: i64,
        exclude_sender: i64,
    ) -> Result<i64, AppError> {
        let inner = self.inner.lock().await;
        Ok(inner
            .messages
            .iter()
            .filter(|m| m.room_id == room_id && m.id > after_id && m.sender.id != exclude_sender)
            .count() as i64)
    }
}

#[async_trait]
impl ReadCursorStore for MemoryStore {
    async fn mark_read(
        &self,
        room_id: i64,
        receiver_id: i64,
        message_id: i64,
    ) -> Result<(), AppError> {
        let mut inner = self.inner.lock().await;
        inner.cursors.insert((room_id, receiver_id), message_id);
        Ok(())
    }

    async fn last_read(&self, room_id: i64, receiver_id: i64) -> Result<Option<i64>, AppError> {
        let inner = self.inner.lock().await;
        Ok(inner.cursors.get(&(room_id, receiver_id)).copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MessageKind;

    fn alice() -> UserProfile {
        UserProfile {
            id: 1,
            username: "alice".into(),
            avatar: None,
        }
    }

    fn text_message(room_id: i64, sender_id: i64, content: &str) -> NewMessage {
        NewMessage {
            room_type: "private".into(),
            room_id,
            sender_id,
            kind: MessageKind::Text,
            content: Some(content.into()),
            file: None,
            filename: None,
        }
    }

    #[tokio::test]
    async fn ids_are_strictly_increasing() {
        let store = MemoryStore::new();
        store.insert_user(alice()).await;
        let first = store.create_message(text_message(1, 1, "a")).await.unwrap();
        let second = store.create_message(text_message(1, 1, "b")).await.unwrap();
        assert!(second.id > first.id);
    }

    #[tokio::test]
    async fn messages_after_excludes_sender_and_orders_ascending() {
        let store = MemoryStore::new();
        store.insert_user(alice()).await;
        store
            .insert_user(UserProfile {
                id: 2,
                username: "bob".into(),
                avatar: None,
            })
            .await;
        for content in ["one", "two", "three"] {
            store
                .create_message(text_message(9, 2, content))
                .await
                .unwrap();
        }
        store.create_message(text_message(9, 1, "mine")).await.unwrap();

        let unread = store.messages_after(9, 0, 1).await.unwrap();
        assert_eq!(unread.len(), 3);
        assert!(unread.windows(2).all(|w| w[0].id < w[1].id));
        assert!(unread.iter().all(|m| m.sender.id != 1));
    }

    #[tokio::test]
    async fn mark_read_is_last_write_wins() {
        let store = MemoryStore::new();
        store.mark_read(5, 1, 10).await.unwrap();
        store.mark_read(5, 1, 3).await.unwrap();
        assert_eq!(store.last_read(5, 1).await.unwrap(), Some(3));
    }
}
