use std::sync::Arc;

use anyhow::{Context, Result};
use sqlx::MySqlPool;
use sqlx::mysql::MySqlPoolOptions;
use tracing::{info, warn};

use crate::config::Config;
use crate::store::{MemoryStore, MySqlStore, Store};

pub async fn init_db(database_url: &str) -> Result<MySqlPool> {
    let pool = MySqlPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await
        .context("Failed to connect to database")?;
    sqlx::migrate!()
        .run(&pool)
        .await
        .context("Failed to run migrations")?;
    Ok(pool)
}

/// MySQL when `DATABASE_URL` is set and reachable, otherwise the in-memory
/// store. The flag is `true` for the in-memory store.
pub async fn init_store(config: &Config) -> (Arc<dyn Store>, bool) {
    let Some(url) = config.database_url.as_deref() else {
        info!("DATABASE_URL not set, using in-memory store");
        return (Arc::new(MemoryStore::new()), true);
    };

    match init_db(url).await {
        Ok(pool) => {
            info!("Connected to MySQL");
            (Arc::new(MySqlStore::new(pool)), false)
        }
        Err(e) => {
            warn!(error = %format!("{:#}", e), "database unavailable, falling back to in-memory store");
            (Arc::new(MemoryStore::new()), true)
        }
    }
}
