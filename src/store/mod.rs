//! Data-access ports for the durable store. The realtime core only ever
//! talks to these traits; `postgres` is the production adapter and `memory`
//! backs tests and local development.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;

use crate::error::AppError;
use crate::models::{NewMessage, StoredMessage, UserProfile};

#[async_trait]
pub trait IdentityStore: Send + Sync {
    /// Resolve a user id to its profile. `Ok(None)` means the user does not
    /// exist (deleted accounts included).
    async fn user_by_id(&self, user_id: i64) -> Result<Option<UserProfile>, AppError>;
}

#[async_trait]
pub trait MessageStore: Send + Sync {
    /// Persist a message; the store assigns a strictly increasing id and the
    /// timestamp, and returns the canonical stored form.
    async fn create_message(&self, new: NewMessage) -> Result<StoredMessage, AppError>;

    async fn message_by_id(&self, message_id: i64) -> Result<Option<StoredMessage>, AppError>;

    /// Messages in `room_id` with id strictly greater than `after_id`, not
    /// authored by `exclude_sender`, ascending by id.
    async fn messages_after(
        &self,
        room_id: i64,
        after_id: i64,
        exclude_sender: i64,
    ) -> Result<Vec<StoredMessage>, AppError>;

    /// Count of what `messages_after` would return.
    async fn count_after(
        &self,
        room_id: i64,
        after_id: i64,
        exclude_sender: i64,
    ) -> Result<i64, AppError>;
}

#[async_trait]
pub trait ReadCursorStore: Send + Sync {
    /// Upsert the (room, receiver) cursor to `message_id`, unconditionally
    /// replacing any prior value. Last write wins; callers own monotonicity.
    async fn mark_read(
        &self,
        room_id: i64,
        receiver_id: i64,
        message_id: i64,
    ) -> Result<(), AppError>;

    async fn last_read(&self, room_id: i64, receiver_id: i64) -> Result<Option<i64>, AppError>;
}
