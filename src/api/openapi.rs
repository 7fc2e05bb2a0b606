//! OpenAPI documentation configuration.
//!
//! Provides Swagger UI for API exploration and testing.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::api::handlers::{auth_handler, config_handler, email_handler, health_handler};
use crate::config::SESSION_COOKIE_NAME;
use crate::domain::{
    Appearance, ConfigEntry, ConfigUpsert, Language, PersonalInfo, SiteInfo, SmtpSettings,
    SocialLink, Theme, UserResponse, UserRole, UserStatus,
};
use crate::errors::FieldError;
use crate::services::UploadedAsset;
use crate::types::MessageResponse;

/// OpenAPI documentation for the blog backend
#[derive(OpenApi)]
#[openapi(
    info(
        title = "ohmyblog API",
        version = "0.1.0",
        description = "Blog backend: cookie sessions, site configuration and asset uploads",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    servers(
        (url = "http://localhost:3000", description = "Local development server")
    ),
    paths(
        auth_handler::register,
        auth_handler::login,
        auth_handler::logout,
        auth_handler::me,
        config_handler::upsert_config,
        config_handler::list_configs,
        config_handler::get_config,
        config_handler::delete_config,
        config_handler::upload_icon,
        config_handler::upload_hero,
        config_handler::upload_avatar,
        email_handler::test_smtp,
        health_handler::health,
    ),
    components(
        schemas(
            // Domain types
            UserRole,
            UserStatus,
            UserResponse,
            ConfigEntry,
            ConfigUpsert,
            Appearance,
            Theme,
            Language,
            SiteInfo,
            PersonalInfo,
            SocialLink,
            SmtpSettings,
            // Request/response types
            auth_handler::RegisterRequest,
            auth_handler::LoginRequest,
            auth_handler::AuthResponse,
            config_handler::ConfigResponse,
            config_handler::ConfigListResponse,
            config_handler::UploadResponse,
            config_handler::IconUpload,
            config_handler::HeroUpload,
            config_handler::AvatarUpload,
            health_handler::HealthResponse,
            UploadedAsset,
            MessageResponse,
            FieldError,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Authentication", description = "Registration, login and session cookie"),
        (name = "Config", description = "Site configuration and system asset uploads"),
        (name = "Email", description = "SMTP connectivity checks"),
        (name = "Health", description = "Service status")
    )
)]
pub struct ApiDoc;

/// Security scheme modifier for the session cookie
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "cookie_auth",
                SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                    SESSION_COOKIE_NAME,
                    "HTTP-only session cookie set by /api/auth/login",
                ))),
            );
        }
    }
}
