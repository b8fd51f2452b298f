use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::{AppError, ErrorResponse};
use crate::middleware::guards::AuthedUser;
use crate::models::{MessageKind, NewMessage, StoredMessage};
use crate::state::AppState;

#[derive(Debug, Deserialize, ToSchema)]
pub struct SendMessageRequest {
    pub messages_type: MessageKind,
    /// "private" or "group"; owned by the room collaborator, carried through
    /// verbatim. Defaults to "private".
    #[serde(default)]
    pub room_type: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    /// Reference into the media store; uploads happen elsewhere.
    #[serde(default)]
    pub file: Option<String>,
    #[serde(default)]
    pub filename: Option<String>,
}

impl SendMessageRequest {
    fn validate(&self) -> Result<(), AppError> {
        match self.messages_type {
            MessageKind::Text if self.content.is_none() => Err(AppError::BadRequest(
                "text messages must provide content".into(),
            )),
            MessageKind::Image | MessageKind::Video | MessageKind::File
                if self.file.is_none() =>
            {
                Err(AppError::BadRequest(format!(
                    "{} messages must provide a file",
                    self.messages_type.as_str()
                )))
            }
            _ => Ok(()),
        }
    }
}

/// Persist a message, then broadcast the stored form to the room's group.
/// The broadcast only ever runs after the durable write succeeded; if no one
/// is connected it is a no-op and the message waits in the store for
/// reconciliation.
#[utoipa::path(
    post,
    path = "/api/v1/rooms/{room_id}/messages",
    tag = "Messages",
    params(("room_id" = i64, Path, description = "Target room")),
    request_body = SendMessageRequest,
    responses(
        (status = 201, description = "Message persisted and broadcast", body = StoredMessage),
        (status = 400, description = "Payload invalid", body = ErrorResponse),
        (status = 401, description = "Missing or invalid bearer token", body = ErrorResponse)
    )
)]
pub async fn send_message(
    State(state): State<AppState>,
    user: AuthedUser,
    Path(room_id): Path<i64>,
    Json(body): Json<SendMessageRequest>,
) -> Result<(StatusCode, Json<StoredMessage>), AppError> {
    body.validate()?;

    let message = state
        .messages
        .create_message(NewMessage {
            room_type: body.room_type.unwrap_or_else(|| "private".into()),
            room_id,
            sender_id: user.id,
            kind: body.messages_type,
            content: body.content,
            file: body.file,
            filename: body.filename,
        })
        .await?;

    state.realtime.publish_chat_message(room_id, &message).await;

    Ok((StatusCode::CREATED, Json(message)))
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MarkReadResponse {
    pub message: i64,
    pub receiver: i64,
}

/// Move the caller's read cursor in a room to the given message.
#[utoipa::path(
    post,
    path = "/api/v1/rooms/{room_id}/messages/{message_id}/read",
    tag = "Messages",
    params(
        ("room_id" = i64, Path, description = "Room the cursor belongs to"),
        ("message_id" = i64, Path, description = "Last message the caller has read")
    ),
    responses(
        (status = 201, description = "Cursor updated", body = MarkReadResponse),
        (status = 400, description = "Message belongs to another room", body = ErrorResponse),
        (status = 404, description = "No such message", body = ErrorResponse)
    )
)]
pub async fn mark_read(
    State(state): State<AppState>,
    user: AuthedUser,
    Path((room_id, message_id)): Path<(i64, i64)>,
) -> Result<(StatusCode, Json<MarkReadResponse>), AppError> {
    state
        .read_cursors
        .mark_read(room_id, user.id, message_id)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(MarkReadResponse {
            message: message_id,
            receiver: user.id,
        }),
    ))
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UnreadCountResponse {
    pub unread_count: i64,
}

/// Messages in the room the caller has not read, excluding their own.
#[utoipa::path(
    get,
    path = "/api/v1/rooms/{room_id}/messages/unread-count",
    tag = "Messages",
    params(("room_id" = i64, Path, description = "Room to count in")),
    responses(
        (status = 200, description = "Current unread count", body = UnreadCountResponse)
    )
)]
pub async fn unread_count(
    State(state): State<AppState>,
    user: AuthedUser,
    Path(room_id): Path<i64>,
) -> Result<Json<UnreadCountResponse>, AppError> {
    let unread_count = state.read_cursors.unread_count(room_id, user.id).await?;
    Ok(Json(UnreadCountResponse { unread_count }))
}
