//! Application state management
//!
//! This module contains the shared application state handed to everything
//! that works with the problem bank.

use std::sync::Arc;

use sqlx::PgPool;

use crate::{
    config::Config,
    db::repositories::{PgProblemRepository, PgUserRepository},
    services::ProblemStore,
    storage::{LocalFileStorage, TestcaseDirectories},
};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

/// Inner state (wrapped in Arc for cheap cloning)
struct AppStateInner {
    /// Database connection pool
    pub db: PgPool,

    /// Problem lifecycle service
    pub problems: ProblemStore,

    /// Application configuration
    pub config: Config,
}

impl AppState {
    /// Create a new application state backed by PostgreSQL and local disk
    pub fn new(db: PgPool, config: Config) -> Self {
        let problems = ProblemStore::new(
            Arc::new(PgProblemRepository::new(db.clone())),
            Arc::new(PgUserRepository::new(db.clone())),
            Arc::new(LocalFileStorage::new(&config.storage.media_root)),
            TestcaseDirectories::new(&config.storage.bank_root),
        );

        Self {
            inner: Arc::new(AppStateInner {
                db,
                problems,
                config,
            }),
        }
    }

    /// Get a reference to the database pool
    pub fn db(&self) -> &PgPool {
        &self.inner.db
    }

    /// Get a reference to the problem store
    pub fn problems(&self) -> &ProblemStore {
        &self.inner.problems
    }

    /// Get a reference to the configuration
    pub fn config(&self) -> &Config {
        &self.inner.config
    }
}
