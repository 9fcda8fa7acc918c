use sqlx::SqlitePool;
use std::path::PathBuf;
use std::sync::Arc;

use crate::config::Config;

/// Shared by every request. Built once in `main` from the parsed [`Config`].
#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(pool: SqlitePool, config: Config) -> Self {
        Self {
            pool,
            config: Arc::new(config),
        }
    }

    pub fn bcrypt_cost(&self) -> u32 {
        self.config.bcrypt_cost
    }

    pub fn static_dirs(&self) -> &[PathBuf] {
        &self.config.static_dirs
    }
}
