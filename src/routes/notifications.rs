//! HTTP face of the dispatcher for out-of-process domain services. All
//! handlers are fire-and-forget: they answer 202 once the event is handed to
//! the fan-out layer, and a missing recipient is the dispatcher's problem
//! (logged and dropped), never the caller's.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use utoipa::ToSchema;

use crate::error::ErrorResponse;
use crate::state::AppState;
use crate::websocket::events::NotificationLevel;

#[derive(Debug, Deserialize, ToSchema)]
pub struct FriendRequestNotification {
    pub sender_id: i64,
    pub receiver_id: i64,
    #[serde(default)]
    pub message: String,
}

#[utoipa::path(
    post,
    path = "/api/v1/notifications/friend-request",
    tag = "Notifications",
    request_body = FriendRequestNotification,
    responses(
        (status = 202, description = "Queued for delivery"),
        (status = 401, description = "Missing or invalid bearer token", body = ErrorResponse)
    )
)]
pub async fn friend_request(
    State(state): State<AppState>,
    Json(body): Json<FriendRequestNotification>,
) -> StatusCode {
    state
        .realtime
        .send_friend_request_notification(body.sender_id, body.receiver_id, &body.message)
        .await;
    StatusCode::ACCEPTED
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct FriendAcceptedNotification {
    /// The party being announced.
    pub friend_id: i64,
    /// The party being notified.
    pub user_id: i64,
}

#[utoipa::path(
    post,
    path = "/api/v1/notifications/friend-accepted",
    tag = "Notifications",
    request_body = FriendAcceptedNotification,
    responses(
        (status = 202, description = "Queued for delivery"),
        (status = 401, description = "Missing or invalid bearer token", body = ErrorResponse)
    )
)]
pub async fn friend_accepted(
    State(state): State<AppState>,
    Json(body): Json<FriendAcceptedNotification>,
) -> StatusCode {
    state
        .realtime
        .send_friend_accepted_notification(body.friend_id, body.user_id)
        .await;
    StatusCode::ACCEPTED
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SystemNotificationRequest {
    pub user_id: i64,
    pub title: String,
    pub message: String,
    #[serde(default)]
    pub level: NotificationLevel,
}

#[utoipa::path(
    post,
    path = "/api/v1/notifications/system",
    tag = "Notifications",
    request_body = SystemNotificationRequest,
    responses(
        (status = 202, description = "Queued for delivery"),
        (status = 401, description = "Missing or invalid bearer token", body = ErrorResponse)
    )
)]
pub async fn system_notification(
    State(state): State<AppState>,
    Json(body): Json<SystemNotificationRequest>,
) -> StatusCode {
    state
        .realtime
        .send_system_notification(body.user_id, &body.title, &body.message, body.level)
        .await;
    StatusCode::ACCEPTED
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct RoomNoticeRequest {
    pub title: String,
    pub message: String,
}

#[utoipa::path(
    post,
    path = "/api/v1/rooms/{room_id}/notice",
    tag = "Notifications",
    params(("room_id" = i64, Path, description = "Room to notify")),
    request_body = RoomNoticeRequest,
    responses(
        (status = 202, description = "Queued for delivery"),
        (status = 401, description = "Missing or invalid bearer token", body = ErrorResponse)
    )
)]
pub async fn room_notice(
    State(state): State<AppState>,
    Path(room_id): Path<i64>,
    Json(body): Json<RoomNoticeRequest>,
) -> StatusCode {
    state
        .realtime
        .send_chat_room_notification(room_id, &body.title, &body.message)
        .await;
    StatusCode::ACCEPTED
}
