use sqlx::postgres::PgPoolOptions;
use sqlx::{Pool, Postgres};

/// Connection pool against the durable store. The schema (users, messages,
/// read cursors) is owned by the storage collaborator, not this service.
pub async fn init_pool(database_url: &str) -> Result<Pool<Postgres>, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await
}
