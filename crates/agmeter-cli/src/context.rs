use agmeter_runtime::Config;
use agmeter_store::Database;
use anyhow::{Context, Result};
use once_cell::sync::OnceCell;
use std::path::PathBuf;

/// Per-invocation state. Config and database are loaded lazily, once,
/// and shared by reference across handlers.
pub struct ExecutionContext {
    config_path: Option<PathBuf>,
    config: OnceCell<Config>,
    db: OnceCell<Database>,
}

impl ExecutionContext {
    pub fn new(config_path: Option<String>) -> Self {
        Self {
            config_path: config_path.map(PathBuf::from),
            config: OnceCell::new(),
            db: OnceCell::new(),
        }
    }

    pub fn config(&self) -> Result<&Config> {
        self.config.get_or_try_init(|| {
            let config = match &self.config_path {
                Some(path) => Config::load_from(path),
                None => Config::load(),
            };
            config.context("failed to load config")
        })
    }

    pub fn db(&self) -> Result<&Database> {
        self.db.get_or_try_init(|| {
            let db_path = self.database_path()?;
            if let Some(parent) = db_path.parent() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("failed to create {}", parent.display()))?;
            }
            Database::open(&db_path)
                .with_context(|| format!("failed to open database at {}", db_path.display()))
        })
    }

    pub fn database_path(&self) -> Result<PathBuf> {
        Ok(self.config()?.database_path()?)
    }
}
