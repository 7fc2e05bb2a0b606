//! Application services layer - Use cases and business logic.
//!
//! Services orchestrate domain logic and infrastructure to fulfill
//! application use cases. They depend on abstractions (traits) for
//! dependency inversion and reach repositories through the Unit of Work.

mod admin_presence;
mod auth_service;
mod config_service;
pub mod container;
mod email_service;
mod upload_service;

// Service Container
pub use container::{ServiceContainer, Services};

// Service traits and implementations
pub use admin_presence::AdminPresence;
pub use auth_service::{AuthService, Authenticator, Claims};
pub use config_service::{ConfigManager, ConfigService, UpsertOutcome};
pub use email_service::{EmailManager, EmailService};
pub use upload_service::{SystemAsset, UploadManager, UploadService, UploadedAsset};
