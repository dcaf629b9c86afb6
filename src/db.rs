use std::sync::Arc;

use anyhow::{Context, Result};
use sqlx::MySqlPool;
use tracing::{info, warn};

use crate::config::{Config, StoreBackend};
use crate::store::{AttendanceStore, MemoryStore, MySqlStore};

pub async fn init_db(database_url: &str) -> Result<MySqlPool> {
    MySqlPool::connect(database_url)
        .await
        .context("Failed to connect to database")
}

/// Opens the configured backend, running migrations for MySQL.
pub async fn init_store(config: &Config) -> Result<Arc<dyn AttendanceStore>> {
    match config.store_backend {
        StoreBackend::Mysql => {
            let url = config
                .database_url
                .as_deref()
                .context("DATABASE_URL must be set for the mysql backend")?;
            let store = MySqlStore::new(init_db(url).await?);
            store
                .run_migrations()
                .await
                .context("Failed to run database migrations")?;
            info!("MySQL store ready");
            Ok(Arc::new(store))
        }
        StoreBackend::Memory => {
            warn!("Using the in-memory store, records are lost on restart");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}
