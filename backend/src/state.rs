use crate::{
    configuration::Settings,
    modules::{
        database::{get_sqlite_pool, DatabaseError},
        extractors::jwt::{JwtAccessSecret, TokenExtractors},
        storage::{Blobs, LocalBlobStore},
    },
};
use axum::extract::FromRef;
use sqlx::SqlitePool;
use std::sync::Arc;

pub const MEDIA_URL: &str = "/media";

#[derive(FromRef, Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub token_ext: TokenExtractors,
    pub blobs: Blobs,
}

impl AppState {
    pub async fn new(config: &Settings, test_pool: Option<SqlitePool>) -> Result<Self, DatabaseError> {
        let token_ext = TokenExtractors {
            access: JwtAccessSecret(config.app.jwt_secret.clone()),
            secure_cookies: config.app.secure_cookies,
        };

        let db = match test_pool {
            Some(pool) => pool,
            None => get_sqlite_pool(config.database.clone()).await?,
        };

        Ok(AppState {
            db,
            token_ext,
            blobs: Arc::new(LocalBlobStore::new(&config.storage.media_root, MEDIA_URL)),
        })
    }
}
