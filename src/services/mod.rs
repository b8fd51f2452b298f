pub mod read_cursor;
pub mod realtime;
pub mod reconcile;

pub use read_cursor::ReadCursorService;
pub use realtime::RealtimeService;
pub use reconcile::UnreadReconciler;
