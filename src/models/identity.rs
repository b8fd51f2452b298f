use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Profile fields carried along with every resolved identity; `avatar` is a
/// reference into the media store, never file bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct UserProfile {
    pub id: i64,
    pub username: String,
    pub avatar: Option<String>,
}

/// Outcome of the connection handshake. Credential failures of any kind
/// resolve to `Anonymous`; the session layer refuses anonymous connections
/// before any group membership is established.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Identity {
    Anonymous,
    User(UserProfile),
}

impl Identity {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Identity::User(_))
    }

    pub fn into_user(self) -> Option<UserProfile> {
        match self {
            Identity::User(profile) => Some(profile),
            Identity::Anonymous => None,
        }
    }
}
