//! Application state management

use std::sync::Arc;

use crate::{
    config::Config,
    database::Database,
    error::Result,
    repository::{OrderRepository, PetRepository, UserRepository},
};

/// Application state shared across handlers
///
/// Built once at startup around the already-opened [`Database`] and handed to
/// the router; every handler receives a clone.
#[derive(Debug, Clone)]
pub struct AppState {
    config: Arc<Config>,
    db: Database,
}

impl AppState {
    /// Create a new AppState from configuration and an open store
    pub fn new(config: Config, db: Database) -> Self {
        Self {
            config: Arc::new(config),
            db,
        }
    }

    /// State over a fresh in-memory store, for tests
    pub async fn in_memory() -> Result<Self> {
        Ok(Self::new(Config::for_tests(), Database::in_memory().await?))
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Get the storage handle
    pub fn db(&self) -> &Database {
        &self.db
    }

    pub fn pets(&self) -> PetRepository<'_> {
        PetRepository::new(self.db.pool())
    }

    pub fn orders(&self) -> OrderRepository<'_> {
        OrderRepository::new(self.db.pool())
    }

    pub fn users(&self) -> UserRepository<'_> {
        UserRepository::new(self.db.pool())
    }
}
