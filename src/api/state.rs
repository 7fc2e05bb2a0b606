//! Application state - Dependency injection container.
//!
//! Provides centralized access to all application services.

use std::sync::Arc;
use std::time::Instant;

use crate::config::Config;
use crate::services::{
    AuthService, ConfigService, EmailService, ServiceContainer, Services, UploadService,
};

/// Application state containing all services (DI container).
#[derive(Clone)]
pub struct AppState {
    pub auth_service: Arc<dyn AuthService>,
    pub config_service: Arc<dyn ConfigService>,
    pub upload_service: Arc<dyn UploadService>,
    pub email_service: Arc<dyn EmailService>,
    /// Runtime settings (cookie attributes, version, upload directory)
    pub config: Arc<Config>,
    /// Process start, reported as uptime by the health endpoint
    pub started_at: Instant,
}

impl AppState {
    /// Create application state from database connection and config.
    pub fn from_config(db: sea_orm::DatabaseConnection, config: Config) -> Self {
        let container = Services::from_connection(db, config.clone());
        Self::from_services(&container, config)
    }

    /// Create application state from an already wired container.
    pub fn from_services(container: &impl ServiceContainer, config: Config) -> Self {
        Self {
            auth_service: container.auth(),
            config_service: container.configs(),
            upload_service: container.uploads(),
            email_service: container.email(),
            config: Arc::new(config),
            started_at: Instant::now(),
        }
    }
}
