use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{Pool, Postgres, Row};

use crate::error::AppError;
use crate::models::{MessageKind, NewMessage, StoredMessage, UserProfile};

use super::{IdentityStore, MessageStore, ReadCursorStore};

/// Adapter over the relational store's `users`, `messages` and
/// `read_cursors` tables. Message ids come from the store's sequence, which
/// is what makes them usable as the unread ordering authority.
#[derive(Clone)]
pub struct PgStore {
    db: Pool<Postgres>,
}

impl PgStore {
    pub fn new(db: Pool<Postgres>) -> Self {
        Self { db }
    }
}

const MESSAGE_COLUMNS: &str = "m.id, m.room_type, m.room_id, m.messages_type, m.content, \
     m.file, m.filename, m.timestamp, u.id AS sender_id, u.username, u.user_avatar";

fn row_to_message(row: &PgRow) -> Result<StoredMessage, sqlx::Error> {
    let kind: String = row.try_get("messages_type")?;
    let timestamp: DateTime<Utc> = row.try_get("timestamp")?;
    Ok(StoredMessage {
        id: row.try_get("id")?,
        sender: UserProfile {
            id: row.try_get("sender_id")?,
            username: row.try_get("username")?,
            avatar: row.try_get("user_avatar")?,
        },
        timestamp,
        room_type: row.try_get("room_type")?,
        room_id: row.try_get("room_id")?,
        kind: MessageKind::from_db(&kind),
        content: row.try_get("content")?,
        file: row.try_get("file")?,
        filename: row.try_get("filename")?,
    })
}

#[async_trait]
impl IdentityStore for PgStore {
    async fn user_by_id(&self, user_id: i64) -> Result<Option<UserProfile>, AppError> {
        let row = sqlx::query("SELECT id, username, user_avatar FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(&self.db)
            .await?;
        Ok(match row {
            Some(row) => Some(UserProfile {
                id: row.try_get("id")?,
                username: row.try_get("username")?,
                avatar: row.try_get("user_avatar")?,
            }),
            None => None,
        })
    }
}

#[async_trait]
impl MessageStore for PgStore {
    async fn create_message(&self, new: NewMessage) -> Result<StoredMessage, AppError> {
        let row = sqlx::query(
            "INSERT INTO messages (room_type, room_id, sender_id, messages_type, content, file, filename) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING id, timestamp",
        )
        .bind(&new.room_type)
        .bind(new.room_id)
        .bind(new.sender_id)
        .bind(new.kind.as_str())
        .bind(&new.content)
        .bind(&new.file)
        .bind(&new.filename)
        .fetch_one(&self.db)
        .await?;
        let id: i64 = row.try_get("id")?;
        let timestamp: DateTime<Utc> = row.try_get("timestamp")?;

        let sender = self
            .user_by_id(new.sender_id)
            .await?
            .ok_or(AppError::NotFound)?;

        Ok(StoredMessage {
            id,
            sender,
            timestamp,
            room_type: new.room_type,
            room_id: new.room_id,
            kind: new.kind,
            content: new.content,
            file: new.file,
            filename: new.filename,
        })
    }

    async fn message_by_id(&self, message_id: i64) -> Result<Option<StoredMessage>, AppError> {
        let sql = format!(
            "SELECT {MESSAGE_COLUMNS} FROM messages m \
             JOIN users u ON u.id = m.sender_id WHERE m.id = $1"
        );
        let row = sqlx::query(&sql)
            .bind(message_id)
            .fetch_optional(&self.db)
            .await?;
        Ok(match row {
            Some(row) => Some(row_to_message(&row)?),
            None => None,
        })
    }

    async fn messages_after(
        &self,
        room_id: i64,
        after_id: i64,
        exclude_sender: i64,
    ) -> Result<Vec<StoredMessage>, AppError> {
        let sql = format!(
            "SELECT {MESSAGE_COLUMNS} FROM messages m \
             JOIN users u ON u.id = m.sender_id \
             WHERE m.room_id = $1 AND m.id > $2 AND m.sender_id <> $3 \
             ORDER BY m.id ASC"
        );
        let rows = sqlx::query(&sql)
            .bind(room_id)
            .bind(after_id)
            .bind(exclude_sender)
            .fetch_all(&self.db)
            .await?;
        let mut messages = Vec::with_capacity(rows.len());
        for row in &rows {
            messages.push(row_to_message(row)?);
        }
        Ok(messages)
    }

    async fn count_after(
        &self,
        room_id: i64,
        after_id: i64,
        exclude_sender: i64,
    ) -> Result<i64, AppError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM messages \
             WHERE room_id = $1 AND id > $2 AND sender_id <> $3",
        )
        .bind(room_id)
        .bind(after_id)
        .bind(exclude_sender)
        .fetch_one(&self.db)
        .await?;
        Ok(count)
    }
}

#[async_trait]
impl ReadCursorStore for PgStore {
    async fn mark_read(
        &self,
        room_id: i64,
        receiver_id: i64,
        message_id: i64,
    ) -> Result<(), AppError> {
        sqlx::query(
            "INSERT INTO read_cursors (room_id, receiver_id, message_id) VALUES ($1, $2, $3) \
             ON CONFLICT (room_id, receiver_id) DO UPDATE SET message_id = EXCLUDED.message_id",
        )
        .bind(room_id)
        .bind(receiver_id)
        .bind(message_id)
        .execute(&self.db)
        .await?;
        Ok(())
    }

    async fn last_read(&self, room_id: i64, receiver_id: i64) -> Result<Option<i64>, AppError> {
        let cursor: Option<i64> = sqlx::query_scalar(
            "SELECT message_id FROM read_cursors WHERE room_id = $1 AND receiver_id = $2",
        )
        .bind(room_id)
        .bind(receiver_id)
        .fetch_optional(&self.db)
        .await?;
        Ok(cursor)
    }
}
