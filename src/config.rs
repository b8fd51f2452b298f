use dotenvy::dotenv;
use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    /// Shared HS256 signing secret used to verify connection tokens.
    pub jwt_secret: String,
    /// Per-session outbound queue capacity; a subscriber that falls this far
    /// behind is dropped from its group rather than stalling the publisher.
    pub ws_send_queue: usize,
}

impl Config {
    pub fn from_env() -> Result<Self, crate::error::AppError> {
        dotenv().ok();
        let database_url = env::var("DATABASE_URL")
            .map_err(|_| crate::error::AppError::Config("DATABASE_URL missing".into()))?;
        let jwt_secret = env::var("JWT_SECRET")
            .map_err(|_| crate::error::AppError::Config("JWT_SECRET missing".into()))?;
        let port = env::var("PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(8085);
        let ws_send_queue = env::var("WS_SEND_QUEUE")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(256);

        Ok(Self {
            database_url,
            port,
            jwt_secret,
            ws_send_queue,
        })
    }

    pub fn test_defaults() -> Self {
        Self {
            database_url: "postgres://localhost/test".into(),
            port: 8085,
            jwt_secret: "test-secret".into(),
            ws_send_queue: 256,
        }
    }
}
