//! Site configuration: stored entries and the closed set of known settings.
//!
//! Every `configKey` the backend accepts maps to exactly one payload type.
//! Values are parsed into [`SiteSetting`] before they reach storage, and the
//! normalized form is what gets persisted.

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;
use validator::Validate;

use crate::errors::{flatten_validation_errors, AppError, AppResult};

pub const CONFIG_KEY_APPEARANCE: &str = "appearance";
pub const CONFIG_KEY_SITE_INFO: &str = "site_info";
pub const CONFIG_KEY_PERSONAL_INFO: &str = "personal_info";
pub const CONFIG_KEY_SMTP: &str = "smtp";

/// Keys with a known payload schema
pub const KNOWN_CONFIG_KEYS: &[&str] = &[
    CONFIG_KEY_APPEARANCE,
    CONFIG_KEY_SITE_INFO,
    CONFIG_KEY_PERSONAL_INFO,
    CONFIG_KEY_SMTP,
];

/// Stored configuration entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConfigEntry {
    #[schema(example = "site_info")]
    pub config_key: String,
    #[schema(value_type = Object)]
    pub config_value: Value,
    pub description: Option<String>,
    pub is_public: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Create-or-update request for a configuration entry.
///
/// Omitted fields are left untouched on update; `config_value` is required
/// when the key does not exist yet.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConfigUpsert {
    #[validate(length(min = 1, max = 100, message = "Config key must be 1-100 characters"))]
    #[schema(example = "site_info")]
    pub config_key: String,
    #[schema(value_type = Option<Object>)]
    pub config_value: Option<Value>,
    #[validate(length(max = 255, message = "Description must be at most 255 characters"))]
    pub description: Option<String>,
    pub is_public: Option<bool>,
}

/// Fields of an existing entry to overwrite
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigPatch {
    pub config_value: Option<Value>,
    pub description: Option<String>,
    pub is_public: Option<bool>,
}

impl ConfigPatch {
    pub fn is_empty(&self) -> bool {
        self.config_value.is_none() && self.description.is_none() && self.is_public.is_none()
    }
}

/// A brand-new entry ready for insertion
#[derive(Debug, Clone, PartialEq)]
pub struct NewConfigEntry {
    pub config_key: String,
    pub config_value: Value,
    pub description: Option<String>,
    pub is_public: bool,
}

// =============================================================================
// Known settings
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
    Auto,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum Language {
    #[serde(rename = "zh-CN")]
    ZhCn,
    #[serde(rename = "en-US")]
    EnUs,
}

/// `appearance`: theme mode, brand hue and UI language
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Appearance {
    pub theme: Theme,
    #[validate(range(max = 360, message = "Hue must be between 0 and 360"))]
    #[schema(example = 250)]
    pub hue: u16,
    pub language: Language,
}

/// `site_info`: public identity of the blog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SiteInfo {
    #[validate(length(min = 1, max = 100, message = "Title must be 1-100 characters"))]
    #[schema(example = "Blog")]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 200, message = "Subtitle must be at most 200 characters"))]
    pub subtitle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 500, message = "Description must be at most 500 characters"))]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    #[validate(length(max = 20, message = "At most 20 keywords"))]
    pub keywords: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub favicon_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hero_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 500, message = "Footer must be at most 500 characters"))]
    pub footer: Option<String>,
}

/// A profile link shown on the about page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
pub struct SocialLink {
    #[validate(length(min = 1, max = 30, message = "Platform must be 1-30 characters"))]
    #[schema(example = "github")]
    pub platform: String,
    #[validate(url(message = "Invalid URL"))]
    pub url: String,
}

/// `personal_info`: the blog owner's public profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PersonalInfo {
    #[validate(length(min = 1, max = 50, message = "Nickname must be 1-50 characters"))]
    pub nickname: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 500, message = "Bio must be at most 500 characters"))]
    pub bio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 100, message = "Location must be at most 100 characters"))]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(url(message = "Invalid URL"))]
    pub website: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    #[validate(nested)]
    pub social_links: Vec<SocialLink>,
}

/// `smtp`: outgoing mail server. Also the body of the SMTP probe endpoint.
#[derive(Clone, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SmtpSettings {
    pub enabled: bool,
    #[validate(length(min = 1, max = 255, message = "Host must be 1-255 characters"))]
    #[schema(example = "smtp.example.com")]
    pub host: String,
    #[validate(range(min = 1, message = "Port must be between 1 and 65535"))]
    #[schema(example = 465)]
    pub port: u16,
    pub username: String,
    pub password: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(email(message = "Invalid sender email"))]
    pub sender_email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender_name: Option<String>,
}

impl std::fmt::Debug for SmtpSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpSettings")
            .field("enabled", &self.enabled)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("sender_email", &self.sender_email)
            .field("sender_name", &self.sender_name)
            .finish()
    }
}

/// A validated setting, one variant per known `configKey`
#[derive(Debug, Clone, PartialEq)]
pub enum SiteSetting {
    Appearance(Appearance),
    SiteInfo(SiteInfo),
    PersonalInfo(PersonalInfo),
    Smtp(SmtpSettings),
}

impl SiteSetting {
    /// Parse and validate `value` against the schema selected by `key`.
    ///
    /// # Errors
    /// `BadRequest` for an unknown key, `Validation` when the value does not
    /// match the key's schema.
    pub fn parse(key: &str, value: &Value) -> AppResult<Self> {
        match key {
            CONFIG_KEY_APPEARANCE => parse_payload(value).map(Self::Appearance),
            CONFIG_KEY_SITE_INFO => parse_payload(value).map(Self::SiteInfo),
            CONFIG_KEY_PERSONAL_INFO => parse_payload(value).map(Self::PersonalInfo),
            CONFIG_KEY_SMTP => parse_payload(value).map(Self::Smtp),
            other => Err(unknown_key(other)),
        }
    }

    /// Reject keys outside the known set without looking at a value
    pub fn ensure_known_key(key: &str) -> AppResult<()> {
        if KNOWN_CONFIG_KEYS.contains(&key) {
            Ok(())
        } else {
            Err(unknown_key(key))
        }
    }

    pub fn key(&self) -> &'static str {
        match self {
            Self::Appearance(_) => CONFIG_KEY_APPEARANCE,
            Self::SiteInfo(_) => CONFIG_KEY_SITE_INFO,
            Self::PersonalInfo(_) => CONFIG_KEY_PERSONAL_INFO,
            Self::Smtp(_) => CONFIG_KEY_SMTP,
        }
    }

    /// Visibility used when an entry is created without an explicit `isPublic`.
    /// SMTP credentials stay private.
    pub fn default_visibility(&self) -> bool {
        self.key() != CONFIG_KEY_SMTP
    }

    /// Normalized JSON form that gets persisted
    pub fn to_value(&self) -> AppResult<Value> {
        let value = match self {
            Self::Appearance(v) => serde_json::to_value(v),
            Self::SiteInfo(v) => serde_json::to_value(v),
            Self::PersonalInfo(v) => serde_json::to_value(v),
            Self::Smtp(v) => serde_json::to_value(v),
        };
        value.map_err(|e| AppError::internal(format!("Config serialization failed: {}", e)))
    }
}

fn unknown_key(key: &str) -> AppError {
    AppError::bad_request(format!(
        "Unknown config key '{}', expected one of: {}",
        key,
        KNOWN_CONFIG_KEYS.join(", ")
    ))
}

fn parse_payload<T>(value: &Value) -> AppResult<T>
where
    T: DeserializeOwned + Validate,
{
    let payload: T = serde_json::from_value(value.clone())
        .map_err(|e| AppError::validation("configValue", e.to_string()))?;

    payload
        .validate()
        .map_err(|e| AppError::Validation(flatten_validation_errors(&e, Some("configValue"))))?;

    Ok(payload)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fields(err: AppError) -> Vec<String> {
        match err {
            AppError::Validation(fields) => fields.into_iter().map(|f| f.field).collect(),
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_appearance_accepts_valid_payload() {
        let setting = SiteSetting::parse(
            "appearance",
            &json!({"theme": "dark", "hue": 142, "language": "en-US"}),
        )
        .unwrap();

        assert_eq!(setting.key(), "appearance");
        assert_eq!(
            setting.to_value().unwrap(),
            json!({"theme": "dark", "hue": 142, "language": "en-US"})
        );
    }

    #[test]
    fn test_appearance_rejects_out_of_range_hue() {
        let err = SiteSetting::parse(
            "appearance",
            &json!({"theme": "auto", "hue": 361, "language": "zh-CN"}),
        )
        .unwrap_err();
        assert_eq!(fields(err), vec!["configValue.hue"]);
    }

    #[test]
    fn test_appearance_rejects_unknown_theme() {
        let err = SiteSetting::parse(
            "appearance",
            &json!({"theme": "neon", "hue": 10, "language": "zh-CN"}),
        )
        .unwrap_err();
        assert_eq!(fields(err), vec!["configValue"]);
    }

    #[test]
    fn test_site_info_only_requires_title() {
        let setting = SiteSetting::parse("site_info", &json!({"title": "Blog"})).unwrap();
        assert_eq!(setting.to_value().unwrap(), json!({"title": "Blog"}));
    }

    #[test]
    fn test_personal_info_validates_nested_links() {
        let err = SiteSetting::parse(
            "personal_info",
            &json!({
                "nickname": "Ming",
                "socialLinks": [{"platform": "github", "url": "not a url"}]
            }),
        )
        .unwrap_err();
        assert_eq!(fields(err), vec!["configValue.socialLinks[0].url"]);
    }

    #[test]
    fn test_smtp_rejects_port_zero_and_bad_sender() {
        let err = SiteSetting::parse(
            "smtp",
            &json!({
                "enabled": true,
                "host": "smtp.example.com",
                "port": 0,
                "username": "mailer",
                "password": "pw",
                "senderEmail": "nope"
            }),
        )
        .unwrap_err();
        assert_eq!(fields(err), vec!["configValue.port", "configValue.senderEmail"]);
    }

    #[test]
    fn test_unknown_key_is_bad_request() {
        let err = SiteSetting::parse("theme_colors", &json!({})).unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
        assert!(SiteSetting::ensure_known_key("theme_colors").is_err());
        assert!(SiteSetting::ensure_known_key("smtp").is_ok());
    }

    #[test]
    fn test_smtp_debug_redacts_password() {
        let smtp = SmtpSettings {
            enabled: true,
            host: "smtp.example.com".into(),
            port: 587,
            username: "mailer".into(),
            password: "hunter2".into(),
            sender_email: None,
            sender_name: None,
        };
        assert!(!format!("{:?}", smtp).contains("hunter2"));
    }

    #[test]
    fn test_default_visibility() {
        let site_info = SiteSetting::parse("site_info", &json!({"title": "Blog"})).unwrap();
        assert!(site_info.default_visibility());

        let smtp = SiteSetting::parse(
            "smtp",
            &json!({"enabled": false, "host": "localhost", "port": 25, "username": "", "password": ""}),
        )
        .unwrap();
        assert_eq!(smtp.key(), "smtp");
        assert!(!smtp.default_visibility());
    }

    #[test]
    fn test_empty_patch() {
        assert!(ConfigPatch::default().is_empty());
        let patch = ConfigPatch {
            is_public: Some(false),
            ..Default::default()
        };
        assert!(!patch.is_empty());
    }
}
