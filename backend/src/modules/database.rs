use crate::configuration::DatabaseSettings;
use sqlx::migrate;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
pub use sqlx::SqlitePool;
use std::str::FromStr;
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("Sqlite error")]
    Sqlite(#[from] sqlx::Error),
    #[error("Auto migration failed")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

pub async fn get_sqlite_pool(config: DatabaseSettings) -> Result<SqlitePool, DatabaseError> {
    let options = SqliteConnectOptions::from_str(&config.get_connection_string())?
        .create_if_missing(true)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new().connect_with(options).await?;

    if config.is_migrating() {
        migrate!("./migrations").run(&pool).await?;
        info!("Database migrations applied");
    }
    Ok(pool)
}
