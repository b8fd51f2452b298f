use axum::extract::ws::{close_code, CloseFrame, Message, WebSocket};
use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use uuid::Uuid;

use crate::models::{Identity, UserProfile};
use crate::state::AppState;
use crate::websocket::{chat_group, friends_group, notifications_group, Event};

/// What a connection subscribes to, fixed at upgrade time. Each kind derives
/// its group name its own way: chat rooms from the route parameter, the
/// notification kinds from the connecting identity itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionKind {
    Chat { room_id: i64 },
    Friends,
    Notifications,
}

impl SessionKind {
    pub fn group_name(&self, user: &UserProfile) -> String {
        match self {
            SessionKind::Chat { room_id } => chat_group(*room_id),
            SessionKind::Friends => friends_group(user.id),
            SessionKind::Notifications => notifications_group(user.id),
        }
    }
}

/// How the session loop treats one inbound text frame.
#[derive(Debug, PartialEq)]
pub enum InboundAction {
    /// Heartbeat; answer with a pong and consume the frame.
    Pong,
    /// Well-formed JSON that is not a heartbeat; offered to the session
    /// kind's own handling (currently none accepts anything).
    Dispatch(serde_json::Value),
    /// Not valid JSON; dropped, the session stays active.
    Ignore,
}

pub fn classify_inbound(text: &str) -> InboundAction {
    match serde_json::from_str::<serde_json::Value>(text) {
        Ok(value) if value.get("type").and_then(|t| t.as_str()) == Some("ping") => {
            InboundAction::Pong
        }
        Ok(value) => InboundAction::Dispatch(value),
        Err(_) => InboundAction::Ignore,
    }
}

/// Drive one connection from admission to teardown.
///
/// Anonymous identities are refused with a policy-violation close before any
/// group membership exists. Authenticated sessions join their group, chat
/// sessions then replay their unread backlog, and the loop multiplexes group
/// deliveries against client frames until the transport drops or the
/// registry evicts the session (its queue closes). Every exit path leaves
/// the group.
pub async fn run_session(
    state: AppState,
    kind: SessionKind,
    identity: Identity,
    mut socket: WebSocket,
) {
    let Some(user) = identity.into_user() else {
        let _ = socket
            .send(Message::Close(Some(CloseFrame {
                code: close_code::POLICY,
                reason: "authentication required".into(),
            })))
            .await;
        return;
    };

    let session_id = Uuid::new_v4();
    let group = kind.group_name(&user);
    let mut rx = state.registry.join(&group, session_id).await;
    crate::metrics::ACTIVE_SESSIONS.inc();
    tracing::info!(%group, user_id = user.id, "session joined");

    let (mut sink, mut stream) = socket.split();

    // Backlog replay for chat sessions. Joining before the query means any
    // event published while it runs buffers in rx and drains afterwards, so
    // replayed messages always precede live ones (duplicates are possible,
    // delivery is at-least-once).
    if let SessionKind::Chat { room_id } = kind {
        match state.reconciler.reconcile(room_id, user.id).await {
            Ok(backlog) => {
                for event in &backlog {
                    if send_event(&mut sink, event).await.is_err() {
                        close_session(&state, &group, session_id, user.id).await;
                        return;
                    }
                }
            }
            Err(e) => {
                // deliver live events anyway; the client can refetch history
                tracing::warn!(room_id, user_id = user.id, error = %e, "unread reconciliation failed");
            }
        }
    }

    loop {
        tokio::select! {
            delivery = rx.recv() => match delivery {
                Some(event) => {
                    if send_event(&mut sink, &event).await.is_err() {
                        break;
                    }
                }
                // sender side gone: the registry evicted this session
                None => break,
            },
            incoming = stream.next() => match incoming {
                Some(Ok(Message::Text(text))) => match classify_inbound(&text) {
                    InboundAction::Pong => {
                        if send_event(&mut sink, &Event::Pong).await.is_err() {
                            break;
                        }
                    }
                    InboundAction::Dispatch(value) => {
                        tracing::debug!(%group, payload = %value, "ignoring unhandled client payload");
                    }
                    InboundAction::Ignore => {}
                },
                Some(Ok(Message::Close(_))) | None => break,
                // protocol-level ping/pong and binary frames need no reply here
                Some(Ok(_)) => {}
                Some(Err(_)) => break,
            },
        }
    }

    close_session(&state, &group, session_id, user.id).await;
}

async fn close_session(state: &AppState, group: &str, session_id: Uuid, user_id: i64) {
    state.registry.leave(group, session_id).await;
    crate::metrics::ACTIVE_SESSIONS.dec();
    tracing::info!(group, user_id, "session closed");
}

async fn send_event(
    sink: &mut SplitSink<WebSocket, Message>,
    event: &Event,
) -> Result<(), axum::Error> {
    match serde_json::to_string(event) {
        Ok(payload) => sink.send(Message::Text(payload)).await,
        Err(e) => {
            tracing::error!(error = %e, "failed to serialize outbound event");
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: i64) -> UserProfile {
        UserProfile {
            id,
            username: format!("user{id}"),
            avatar: None,
        }
    }

    #[test]
    fn group_names_per_kind() {
        assert_eq!(
            SessionKind::Chat { room_id: 42 }.group_name(&user(1)),
            "chat_42"
        );
        assert_eq!(SessionKind::Friends.group_name(&user(1)), "friends_1");
        assert_eq!(
            SessionKind::Notifications.group_name(&user(9)),
            "notifications_9"
        );
    }

    #[test]
    fn ping_elicits_pong() {
        assert_eq!(classify_inbound(r#"{"type":"ping"}"#), InboundAction::Pong);
    }

    #[test]
    fn malformed_payloads_are_ignored() {
        assert_eq!(classify_inbound("not json"), InboundAction::Ignore);
        assert_eq!(classify_inbound(""), InboundAction::Ignore);
    }

    #[test]
    fn other_json_is_dispatched_not_answered() {
        match classify_inbound(r#"{"type":"typing","room":1}"#) {
            InboundAction::Dispatch(value) => assert_eq!(value["type"], "typing"),
            other => panic!("unexpected action {other:?}"),
        }
        // a payload without a type tag is still well-formed
        assert!(matches!(
            classify_inbound(r#"{"hello":"world"}"#),
            InboundAction::Dispatch(_)
        ));
    }
}
