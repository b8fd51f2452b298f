use axum::{async_trait, extract::FromRequestParts, http::request::Parts};

use crate::error::AppError;

/// The authenticated caller of a REST request, placed into request
/// extensions by the auth middleware. Extracting it from a route that is not
/// behind the middleware rejects with 401 rather than panicking.
#[derive(Debug, Clone, Copy)]
pub struct AuthedUser {
    pub id: i64,
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthedUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthedUser>()
            .copied()
            .ok_or(AppError::Unauthorized)
    }
}
