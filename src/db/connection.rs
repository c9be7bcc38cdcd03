use crate::config::Config;
use crate::db::create_schema;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection};
use std::time::Duration;

pub type DbPool = DatabaseConnection;

pub async fn create_pool(config: &Config) -> Result<DbPool, anyhow::Error> {
    let mut options = ConnectOptions::new(config.database_url());
    options
        .max_connections(20)
        .connect_timeout(Duration::from_secs(10))
        .sqlx_logging(false);

    let db = Database::connect(options).await?;
    create_schema(&db).await?;

    log::info!("Database schema ready ({:?})", db.get_database_backend());
    Ok(db)
}

/// Single-connection in-memory SQLite database with the schema applied.
///
/// The connection count is pinned to one because every SQLite `:memory:`
/// connection opens its own private database.
pub async fn create_memory_pool() -> Result<DbPool, anyhow::Error> {
    let mut options = ConnectOptions::new("sqlite::memory:".to_string());
    options
        .max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);

    let db = Database::connect(options).await?;
    create_schema(&db).await?;
    Ok(db)
}
