use axum::extract::{Request, State};
use axum::http::header;
use axum::middleware::Next;
use axum::response::Response;
use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::models::Identity;
use crate::state::AppState;
use crate::store::IdentityStore;

use super::guards::AuthedUser;

/// Claims carried by connection tokens. Issuance lives with the auth
/// collaborator; this service only ever verifies.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: i64,
    pub exp: i64,
}

/// Verify an HS256 token against the shared secret and extract the subject.
/// Expired, malformed and mis-signed tokens all come back as `None`.
pub fn decode_token(token: &str, secret: &str) -> Option<i64> {
    let key = DecodingKey::from_secret(secret.as_bytes());
    let validation = Validation::new(Algorithm::HS256);
    match jsonwebtoken::decode::<Claims>(token, &key, &validation) {
        Ok(data) => Some(data.claims.user_id),
        Err(_) => None,
    }
}

/// Resolve the `token` connection parameter to an identity. Every failure
/// mode (absent token, bad signature, expiry, unknown user, store error)
/// resolves to `Anonymous`; nothing here ever reaches the transport layer as
/// an error. Admission of anonymous identities is the session layer's call.
pub async fn resolve_ws_identity(
    token: Option<&str>,
    secret: &str,
    identities: &dyn IdentityStore,
) -> Identity {
    let Some(token) = token else {
        return Identity::Anonymous;
    };
    let Some(user_id) = decode_token(token, secret) else {
        tracing::debug!("connection token failed verification");
        return Identity::Anonymous;
    };
    match identities.user_by_id(user_id).await {
        Ok(Some(profile)) => Identity::User(profile),
        Ok(None) => {
            tracing::debug!(user_id, "token subject no longer exists");
            Identity::Anonymous
        }
        Err(e) => {
            tracing::warn!(user_id, error = %e, "identity lookup failed during handshake");
            Identity::Anonymous
        }
    }
}

/// Bearer-token middleware for the REST surface; stores the caller's id in
/// request extensions for the `AuthedUser` extractor.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or(AppError::Unauthorized)?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or(AppError::Unauthorized)?;

    let user_id = decode_token(token, &state.config.jwt_secret).ok_or(AppError::Unauthorized)?;

    req.extensions_mut().insert(AuthedUser { id: user_id });
    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UserProfile;
    use crate::store::memory::MemoryStore;
    use jsonwebtoken::{encode, EncodingKey, Header};

    const SECRET: &str = "test-secret";

    fn token_for(user_id: i64, exp: i64) -> String {
        encode(
            &Header::default(),
            &Claims { user_id, exp },
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap()
    }

    fn fresh_exp() -> i64 {
        chrono::Utc::now().timestamp() + 3600
    }

    #[test]
    fn valid_token_decodes_to_subject() {
        let token = token_for(17, fresh_exp());
        assert_eq!(decode_token(&token, SECRET), Some(17));
    }

    #[test]
    fn expired_token_is_rejected() {
        let token = token_for(17, chrono::Utc::now().timestamp() - 120);
        assert_eq!(decode_token(&token, SECRET), None);
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = token_for(17, fresh_exp());
        assert_eq!(decode_token(&token, "other-secret"), None);
    }

    #[test]
    fn garbage_token_is_rejected() {
        assert_eq!(decode_token("not.a.jwt", SECRET), None);
    }

    #[tokio::test]
    async fn handshake_resolves_known_user() {
        let store = MemoryStore::new();
        store
            .insert_user(UserProfile {
                id: 3,
                username: "carol".into(),
                avatar: None,
            })
            .await;
        let token = token_for(3, fresh_exp());
        let identity = resolve_ws_identity(Some(&token), SECRET, &store).await;
        assert!(identity.is_authenticated());
    }

    #[tokio::test]
    async fn handshake_failures_resolve_to_anonymous() {
        let store = MemoryStore::new();
        let missing_user = token_for(3, fresh_exp());
        for token in [None, Some("garbage"), Some(missing_user.as_str())] {
            let identity = resolve_ws_identity(token, SECRET, &store).await;
            assert_eq!(identity, Identity::Anonymous);
        }
    }
}
