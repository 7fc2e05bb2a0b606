//! Unit of Work: one place to reach every repository.
//!
//! Multi-step flows such as "check, then insert" run as separate statements;
//! uniqueness races are settled by the storage constraints and surface as
//! `Conflict` from the repositories.

use sea_orm::DatabaseConnection;
use std::sync::Arc;

use super::repositories::{ConfigRepository, ConfigStore, UserRepository, UserStore};

/// Unit of Work trait for dependency injection.
pub trait UnitOfWork: Send + Sync {
    fn users(&self) -> Arc<dyn UserRepository>;

    fn configs(&self) -> Arc<dyn ConfigRepository>;
}

/// Concrete implementation of UnitOfWork backed by a database connection
pub struct Persistence {
    user_repo: Arc<UserStore>,
    config_repo: Arc<ConfigStore>,
}

impl Persistence {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            user_repo: Arc::new(UserStore::new(db.clone())),
            config_repo: Arc::new(ConfigStore::new(db)),
        }
    }
}

impl UnitOfWork for Persistence {
    fn users(&self) -> Arc<dyn UserRepository> {
        self.user_repo.clone()
    }

    fn configs(&self) -> Arc<dyn ConfigRepository> {
        self.config_repo.clone()
    }
}

/// Repositories supplied directly, used by service tests with mocks.
#[cfg(any(test, feature = "test-utils"))]
pub struct StaticUnitOfWork {
    pub users: Arc<dyn UserRepository>,
    pub configs: Arc<dyn ConfigRepository>,
}

#[cfg(any(test, feature = "test-utils"))]
impl UnitOfWork for StaticUnitOfWork {
    fn users(&self) -> Arc<dyn UserRepository> {
        self.users.clone()
    }

    fn configs(&self) -> Arc<dyn ConfigRepository> {
        self.configs.clone()
    }
}
