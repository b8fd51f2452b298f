use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::{MessageKind, StoredMessage, UserProfile};

/// Sender block embedded in chat_message events. The wire names differ from
/// the profile model (`name`, `avatar`), so this is its own type rather than
/// a reuse of `UserProfile`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventSender {
    pub id: i64,
    pub name: String,
    pub avatar: Option<String>,
}

impl From<UserProfile> for EventSender {
    fn from(profile: UserProfile) -> Self {
        Self {
            id: profile.id,
            name: profile.username,
            avatar: profile.avatar,
        }
    }
}

/// Severity attached to system notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum NotificationLevel {
    #[default]
    Info,
    Warning,
    Error,
}

/// Everything a session can write to its client. Clients dispatch on the
/// `type` tag; the field sets per kind are frozen wire contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    #[serde(rename = "chat_message")]
    ChatMessage {
        id: i64,
        sender: EventSender,
        timestamp: DateTime<Utc>,
        room_type: String,
        room_id: i64,
        messages_type: MessageKind,
        content: Option<String>,
        file: Option<String>,
        filename: Option<String>,
    },
    #[serde(rename = "chat_notification")]
    ChatNotification { title: String, message: String },
    #[serde(rename = "friend_request")]
    FriendRequest {
        sender_id: i64,
        sender_username: String,
        message: String,
    },
    #[serde(rename = "friend_accepted")]
    FriendAccepted {
        friend_id: i64,
        friend_username: String,
    },
    #[serde(rename = "system_notification")]
    SystemNotification {
        user_id: i64,
        title: String,
        message: String,
        level: NotificationLevel,
    },
    #[serde(rename = "pong")]
    Pong,
}

impl Event {
    pub fn kind(&self) -> &'static str {
        match self {
            Event::ChatMessage { .. } => "chat_message",
            Event::ChatNotification { .. } => "chat_notification",
            Event::FriendRequest { .. } => "friend_request",
            Event::FriendAccepted { .. } => "friend_accepted",
            Event::SystemNotification { .. } => "system_notification",
            Event::Pong => "pong",
        }
    }

    /// The live-delivery form of a persisted message. Backlog replay uses the
    /// same constructor, so clients cannot tell the two apart.
    pub fn chat_message(message: &StoredMessage) -> Self {
        Event::ChatMessage {
            id: message.id,
            sender: message.sender.clone().into(),
            timestamp: message.timestamp,
            room_type: message.room_type.clone(),
            room_id: message.room_id,
            messages_type: message.kind,
            content: message.content.clone(),
            file: message.file.clone(),
            filename: message.filename.clone(),
        }
    }
}
