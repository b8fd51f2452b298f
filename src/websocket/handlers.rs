use axum::extract::ws::WebSocketUpgrade;
use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use serde::Deserialize;

use crate::middleware::auth::resolve_ws_identity;
use crate::state::AppState;
use crate::websocket::session::{run_session, SessionKind};

/// Connection-initiation parameters. The bearer credential rides in the
/// query string because browsers cannot set headers on WebSocket upgrades.
#[derive(Debug, Deserialize)]
pub struct WsAuthParams {
    pub token: Option<String>,
}

/// `GET /ws/chat/:room_id`: live messages for one chat room.
pub async fn chat_ws(
    State(state): State<AppState>,
    Path(room_id): Path<i64>,
    Query(params): Query<WsAuthParams>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    let identity = resolve_ws_identity(
        params.token.as_deref(),
        &state.config.jwt_secret,
        state.identities.as_ref(),
    )
    .await;
    ws.on_upgrade(move |socket| run_session(state, SessionKind::Chat { room_id }, identity, socket))
}

/// `GET /ws/friends`: friend-relationship events for the connecting user.
pub async fn friends_ws(
    State(state): State<AppState>,
    Query(params): Query<WsAuthParams>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    let identity = resolve_ws_identity(
        params.token.as_deref(),
        &state.config.jwt_secret,
        state.identities.as_ref(),
    )
    .await;
    ws.on_upgrade(move |socket| run_session(state, SessionKind::Friends, identity, socket))
}

/// `GET /ws/notifications`: system notifications for the connecting user.
pub async fn notifications_ws(
    State(state): State<AppState>,
    Query(params): Query<WsAuthParams>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    let identity = resolve_ws_identity(
        params.token.as_deref(),
        &state.config.jwt_secret,
        state.identities.as_ref(),
    )
    .await;
    ws.on_upgrade(move |socket| run_session(state, SessionKind::Notifications, identity, socket))
}
