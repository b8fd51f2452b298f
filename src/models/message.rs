use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::identity::UserProfile;

/// Message payload classes. `Text` carries `content`; the other kinds carry
/// a `file` reference plus `filename`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    Text,
    Image,
    Video,
    File,
}

impl MessageKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageKind::Text => "text",
            MessageKind::Image => "image",
            MessageKind::Video => "video",
            MessageKind::File => "file",
        }
    }

    /// Rows written before kind validation existed may carry arbitrary
    /// strings; anything unrecognized reads back as `Text`.
    pub fn from_db(value: &str) -> Self {
        match value {
            "image" => MessageKind::Image,
            "video" => MessageKind::Video,
            "file" => MessageKind::File,
            _ => MessageKind::Text,
        }
    }
}

/// A message as persisted by the durable store. Ids are assigned by the
/// store at creation time and are strictly increasing within a room; unread
/// computation relies on that ordering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct StoredMessage {
    pub id: i64,
    pub sender: UserProfile,
    pub timestamp: DateTime<Utc>,
    pub room_type: String,
    pub room_id: i64,
    #[serde(rename = "messages_type")]
    pub kind: MessageKind,
    pub content: Option<String>,
    pub file: Option<String>,
    pub filename: Option<String>,
}

/// Creation input for the message port; everything except the store-assigned
/// id and timestamp.
#[derive(Debug, Clone)]
pub struct NewMessage {
    pub room_type: String,
    pub room_id: i64,
    pub sender_id: i64,
    pub kind: MessageKind,
    pub content: Option<String>,
    pub file: Option<String>,
    pub filename: Option<String>,
}
