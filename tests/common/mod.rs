use std::sync::Arc;

use jsonwebtoken::{encode, EncodingKey, Header};
use realtime_service::config::Config;
use realtime_service::middleware::auth::Claims;
use realtime_service::models::UserProfile;
use realtime_service::routes;
use realtime_service::state::AppState;
use realtime_service::store::memory::MemoryStore;

pub const JWT_SECRET: &str = "test-secret";

pub struct TestApp {
    pub base: String,
    pub state: AppState,
    pub store: Arc<MemoryStore>,
}

impl TestApp {
    pub fn ws_url(&self, path_and_query: &str) -> String {
        format!("{}{}", self.base.replacen("http", "ws", 1), path_and_query)
    }

    pub async fn seed_user(&self, id: i64, username: &str) {
        self.store
            .insert_user(UserProfile {
                id,
                username: username.into(),
                avatar: None,
            })
            .await;
    }
}

pub async fn start_app() -> TestApp {
    let store = Arc::new(MemoryStore::new());
    let state = AppState::new(
        Arc::new(Config::test_defaults()),
        store.clone(),
        store.clone(),
        store.clone(),
    );
    let app = routes::build_router(state.clone());
    let listener = tokio::net::TcpListener::bind(("127.0.0.1", 0))
        .await
        .unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
    TestApp {
        base: format!("http://{}:{}", addr.ip(), addr.port()),
        state,
        store,
    }
}

pub fn token_for(user_id: i64) -> String {
    let claims = Claims {
        user_id,
        exp: chrono::Utc::now().timestamp() + 3600,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(JWT_SECRET.as_bytes()),
    )
    .unwrap()
}
