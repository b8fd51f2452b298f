use std::sync::Arc;

use crate::config::Config;
use crate::services::{ReadCursorService, RealtimeService, UnreadReconciler};
use crate::store::{IdentityStore, MessageStore, ReadCursorStore};
use crate::websocket::GroupRegistry;

/// Everything the handlers need, wired once at startup. The fan-out registry
/// and the dispatcher are process-wide singletons by construction: built
/// here, only ever cloned, never re-created.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub registry: GroupRegistry,
    pub identities: Arc<dyn IdentityStore>,
    pub messages: Arc<dyn MessageStore>,
    pub realtime: Arc<RealtimeService>,
    pub reconciler: Arc<UnreadReconciler>,
    pub read_cursors: Arc<ReadCursorService>,
}

impl AppState {
    pub fn new(
        config: Arc<Config>,
        identities: Arc<dyn IdentityStore>,
        messages: Arc<dyn MessageStore>,
        cursors: Arc<dyn ReadCursorStore>,
    ) -> Self {
        let registry = GroupRegistry::new(config.ws_send_queue);
        let realtime = Arc::new(RealtimeService::new(registry.clone(), identities.clone()));
        let reconciler = Arc::new(UnreadReconciler::new(messages.clone(), cursors.clone()));
        let read_cursors = Arc::new(ReadCursorService::new(messages.clone(), cursors));

        Self {
            config,
            registry,
            identities,
            messages,
            realtime,
            reconciler,
            read_cursors,
        }
    }
}
