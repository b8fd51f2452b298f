use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Realtime Service API",
        version = "0.1.0",
        description = "Realtime delivery of chat messages, friend events and system notifications",
        license(name = "MIT")
    ),
    paths(
        crate::routes::messages::send_message,
        crate::routes::messages::mark_read,
        crate::routes::messages::unread_count,
        crate::routes::notifications::friend_request,
        crate::routes::notifications::friend_accepted,
        crate::routes::notifications::system_notification,
        crate::routes::notifications::room_notice,
    ),
    components(schemas(
        crate::error::ErrorResponse,
        crate::models::StoredMessage,
        crate::models::UserProfile,
        crate::models::MessageKind,
        crate::websocket::events::NotificationLevel,
        crate::routes::messages::SendMessageRequest,
        crate::routes::messages::MarkReadResponse,
        crate::routes::messages::UnreadCountResponse,
        crate::routes::notifications::FriendRequestNotification,
        crate::routes::notifications::FriendAcceptedNotification,
        crate::routes::notifications::SystemNotificationRequest,
        crate::routes::notifications::RoomNoticeRequest,
    )),
    tags(
        (name = "Messages", description = "Message ingestion and read cursors"),
        (name = "Notifications", description = "Cross-domain notification dispatch"),
        (name = "WebSocket", description = "Realtime delivery via /ws/chat/{room_id}, /ws/friends and /ws/notifications"),
    )
)]
pub struct ApiDoc;
