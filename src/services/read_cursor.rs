use std::sync::Arc;

use crate::error::AppError;
use crate::store::{MessageStore, ReadCursorStore};

/// Mark-read and unread-count operations over the per-(room, user) cursor.
pub struct ReadCursorService {
    messages: Arc<dyn MessageStore>,
    cursors: Arc<dyn ReadCursorStore>,
}

impl ReadCursorService {
    pub fn new(messages: Arc<dyn MessageStore>, cursors: Arc<dyn ReadCursorStore>) -> Self {
        Self { messages, cursors }
    }

    /// Point the receiver's cursor in `room_id` at `message_id`. The message
    /// must exist and belong to the room; beyond that the write is an
    /// unconditional overwrite. Callers own monotonicity, matching the
    /// store's last-write-wins upsert.
    pub async fn mark_read(
        &self,
        room_id: i64,
        receiver_id: i64,
        message_id: i64,
    ) -> Result<(), AppError> {
        let message = self
            .messages
            .message_by_id(message_id)
            .await?
            .ok_or(AppError::NotFound)?;
        if message.room_id != room_id {
            return Err(AppError::BadRequest(
                "message does not belong to this room".into(),
            ));
        }
        self.cursors.mark_read(room_id, receiver_id, message_id).await
    }

    /// Count of messages in `room_id` past the user's cursor (0 if none),
    /// excluding their own.
    pub async fn unread_count(&self, room_id: i64, user_id: i64) -> Result<i64, AppError> {
        let cursor = self
            .cursors
            .last_read(room_id, user_id)
            .await?
            .unwrap_or(0);
        self.messages.count_after(room_id, cursor, user_id).await
    }
}
