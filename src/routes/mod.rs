use axum::middleware;
use axum::routing::{get, post};
use axum::{Json, Router};
use tower_http::cors::CorsLayer;

pub mod messages;
pub mod notifications;

use crate::metrics::{metrics_handler, track_http_metrics};
use crate::state::AppState;
use crate::websocket::handlers::{chat_ws, friends_ws, notifications_ws};
use messages::{mark_read, send_message, unread_count};
use notifications::{friend_accepted, friend_request, room_notice, system_notification};

async fn openapi_json() -> Json<serde_json::Value> {
    use utoipa::OpenApi;
    Json(serde_json::to_value(crate::openapi::ApiDoc::openapi()).unwrap_or_default())
}

pub fn build_router(state: AppState) -> Router {
    // Business routes, bearer-token secured.
    let api_v1 = Router::new()
        .route("/rooms/:room_id/messages", post(send_message))
        .route(
            "/rooms/:room_id/messages/unread-count",
            get(unread_count),
        )
        .route(
            "/rooms/:room_id/messages/:message_id/read",
            post(mark_read),
        )
        .route("/rooms/:room_id/notice", post(room_notice))
        .route("/notifications/friend-request", post(friend_request))
        .route("/notifications/friend-accepted", post(friend_accepted))
        .route("/notifications/system", post(system_notification))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            crate::middleware::auth::auth_middleware,
        ));

    // Connection endpoints carry their credential as a query parameter and do
    // their own admission control, so they sit outside the auth layer.
    let ws = Router::new()
        .route("/ws/chat/:room_id", get(chat_ws))
        .route("/ws/friends", get(friends_ws))
        .route("/ws/notifications", get(notifications_ws));

    // Introspection stays public for healthchecks and scrapers.
    let introspection = Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/metrics", get(metrics_handler))
        .route("/openapi.json", get(openapi_json));

    let router = introspection.merge(ws).nest("/api/v1", api_v1);

    crate::middleware::logging::add_tracing(router)
        .layer(middleware::from_fn(track_http_metrics))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
