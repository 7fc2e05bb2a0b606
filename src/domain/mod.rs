//! Domain layer - Core business entities and logic
//!
//! Users, passwords and site settings, independent of storage and transport.

pub mod password;
pub mod site_config;
pub mod user;

pub use password::Password;
pub use site_config::{
    Appearance, ConfigEntry, ConfigPatch, ConfigUpsert, Language, NewConfigEntry, PersonalInfo,
    SiteInfo, SiteSetting, SmtpSettings, SocialLink, Theme,
};
pub use user::{User, UserResponse, UserRole, UserStatus};
