// Application state module
// Holds the loaded configuration and the in-memory task list

use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tokio::sync::{Notify, RwLock};

use super::types::Config;
use crate::webapi::store::{SeedError, TaskStore};

/// Application state
pub struct AppState {
    pub config: Config,
    pub tasks: RwLock<TaskStore>,
    pub shutdown_signal: Arc<Notify>,

    // Cached config values for fast access without locks
    pub cached_access_log: Arc<AtomicBool>,
}

impl AppState {
    /// Create `AppState`, seeding the task list as configured
    pub fn new(config: &Config) -> Result<Self, SeedError> {
        let store = TaskStore::seeded(&config.fixture)?;

        Ok(Self {
            config: config.clone(),
            tasks: RwLock::new(store),
            shutdown_signal: Arc::new(Notify::new()),
            cached_access_log: Arc::new(AtomicBool::new(config.logging.access_log)),
        })
    }
}
