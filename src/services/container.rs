//! Service Container - Centralized service access.
//!
//! Wires every service to the shared Unit of Work, the admin presence flag
//! and the external adapters (image transcoder, SMTP client).

use std::sync::Arc;

use super::{
    AdminPresence, AuthService, Authenticator, ConfigManager, ConfigService, EmailManager,
    EmailService, UploadManager, UploadService,
};
use crate::config::Config;
use crate::infra::{ImageTranscoder, LettreMailer, Persistence, SmtpProbe, Transcoder};

/// Service container trait for dependency injection.
pub trait ServiceContainer: Send + Sync {
    fn auth(&self) -> Arc<dyn AuthService>;

    fn configs(&self) -> Arc<dyn ConfigService>;

    fn uploads(&self) -> Arc<dyn UploadService>;

    fn email(&self) -> Arc<dyn EmailService>;
}

/// Concrete implementation of ServiceContainer
pub struct Services {
    auth_service: Arc<dyn AuthService>,
    config_service: Arc<dyn ConfigService>,
    upload_service: Arc<dyn UploadService>,
    email_service: Arc<dyn EmailService>,
}

impl Services {
    /// Create service container from database connection and config
    pub fn from_connection(db: sea_orm::DatabaseConnection, config: Config) -> Self {
        Self::with_adapters(db, config, Arc::new(ImageTranscoder), Arc::new(LettreMailer))
    }

    /// Same as `from_connection` with explicit external adapters
    pub fn with_adapters(
        db: sea_orm::DatabaseConnection,
        config: Config,
        transcoder: Arc<dyn Transcoder>,
        smtp: Arc<dyn SmtpProbe>,
    ) -> Self {
        let uow = Arc::new(Persistence::new(db));
        let admins = Arc::new(AdminPresence::new());
        let assets_dir = config.system_assets_dir();

        Self {
            auth_service: Arc::new(Authenticator::new(uow.clone(), config, admins)),
            config_service: Arc::new(ConfigManager::new(uow.clone())),
            upload_service: Arc::new(UploadManager::new(uow, transcoder, assets_dir)),
            email_service: Arc::new(EmailManager::new(smtp)),
        }
    }
}

impl ServiceContainer for Services {
    fn auth(&self) -> Arc<dyn AuthService> {
        self.auth_service.clone()
    }

    fn configs(&self) -> Arc<dyn ConfigService> {
        self.config_service.clone()
    }

    fn uploads(&self) -> Arc<dyn UploadService> {
        self.upload_service.clone()
    }

    fn email(&self) -> Arc<dyn EmailService> {
        self.email_service.clone()
    }
}
