pub mod identity;
pub mod message;

pub use identity::{Identity, UserProfile};
pub use message::{MessageKind, NewMessage, StoredMessage};
