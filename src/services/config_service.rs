//! Site configuration service.
//!
//! One upsert operation serves both creation and update; which one happens
//! depends on whether the key already exists. Values are validated against
//! the key's schema before they reach storage.

use async_trait::async_trait;
use std::sync::Arc;

use crate::domain::{ConfigEntry, ConfigPatch, ConfigUpsert, NewConfigEntry, SiteSetting};
use crate::errors::{AppError, AppResult};
use crate::infra::UnitOfWork;

/// Result of an upsert, telling the caller which branch ran
#[derive(Debug, Clone, PartialEq)]
pub enum UpsertOutcome {
    Created(ConfigEntry),
    Updated(ConfigEntry),
}

impl UpsertOutcome {
    pub fn is_created(&self) -> bool {
        matches!(self, UpsertOutcome::Created(_))
    }

    pub fn into_entry(self) -> ConfigEntry {
        match self {
            UpsertOutcome::Created(entry) | UpsertOutcome::Updated(entry) => entry,
        }
    }
}

#[async_trait]
pub trait ConfigService: Send + Sync {
    /// Create the entry, or overwrite only the supplied fields of an existing one
    async fn upsert(&self, input: ConfigUpsert) -> AppResult<UpsertOutcome>;

    /// Private entries are reported as missing to non-admins
    async fn get_by_key(&self, key: &str, is_admin: bool) -> AppResult<ConfigEntry>;

    async fn delete(&self, key: &str) -> AppResult<()>;

    async fn list(&self, public_only: bool) -> AppResult<Vec<ConfigEntry>>;
}

pub struct ConfigManager<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> ConfigManager<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }
}

#[async_trait]
impl<U: UnitOfWork> ConfigService for ConfigManager<U> {
    async fn upsert(&self, input: ConfigUpsert) -> AppResult<UpsertOutcome> {
        let key = input.config_key;
        SiteSetting::ensure_known_key(&key)?;

        let setting = input
            .config_value
            .as_ref()
            .map(|raw| SiteSetting::parse(&key, raw))
            .transpose()?;

        let configs = self.uow.configs();
        match configs.find_by_key(&key).await? {
            Some(existing) => {
                let patch = ConfigPatch {
                    config_value: setting.as_ref().map(SiteSetting::to_value).transpose()?,
                    description: input.description,
                    is_public: input.is_public,
                };
                if patch.is_empty() {
                    return Ok(UpsertOutcome::Updated(existing));
                }

                let entry = configs.update_by_key(&key, patch).await?;
                tracing::info!(config_key = %key, "Config updated");
                Ok(UpsertOutcome::Updated(entry))
            }
            None => {
                let setting = setting.ok_or_else(|| {
                    AppError::bad_request("configValue is required when creating a config entry")
                })?;
                let is_public = input
                    .is_public
                    .unwrap_or_else(|| setting.default_visibility());

                let entry = configs
                    .create(NewConfigEntry {
                        config_key: setting.key().to_string(),
                        config_value: setting.to_value()?,
                        description: input.description,
                        is_public,
                    })
                    .await?;
                tracing::info!(config_key = %entry.config_key, is_public, "Config created");
                Ok(UpsertOutcome::Created(entry))
            }
        }
    }

    async fn get_by_key(&self, key: &str, is_admin: bool) -> AppResult<ConfigEntry> {
        match self.uow.configs().find_by_key(key).await? {
            Some(entry) if entry.is_public || is_admin => Ok(entry),
            _ => Err(AppError::not_found("Config")),
        }
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        if !self.uow.configs().delete_by_key(key).await? {
            return Err(AppError::not_found("Config"));
        }

        tracing::info!(config_key = %key, "Config deleted");
        Ok(())
    }

    async fn list(&self, public_only: bool) -> AppResult<Vec<ConfigEntry>> {
        self.uow.configs().list(public_only).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::{MockConfigRepository, MockUserRepository, StaticUnitOfWork};
    use chrono::Utc;
    use mockall::predicate::eq;
    use serde_json::json;

    fn service(configs: MockConfigRepository) -> ConfigManager<StaticUnitOfWork> {
        ConfigManager::new(Arc::new(StaticUnitOfWork {
            users: Arc::new(MockUserRepository::new()),
            configs: Arc::new(configs),
        }))
    }

    fn entry(key: &str, value: serde_json::Value, is_public: bool) -> ConfigEntry {
        let now = Utc::now();
        ConfigEntry {
            config_key: key.to_string(),
            config_value: value,
            description: Some("original".into()),
            is_public,
            created_at: now,
            updated_at: now,
        }
    }

    fn upsert(key: &str, value: Option<serde_json::Value>) -> ConfigUpsert {
        ConfigUpsert {
            config_key: key.to_string(),
            config_value: value,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_create_requires_value() {
        let mut configs = MockConfigRepository::new();
        configs.expect_find_by_key().returning(|_| Ok(None));
        configs.expect_create().never();

        let err = service(configs)
            .upsert(upsert("site_info", None))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn test_create_stores_normalized_value() {
        let mut configs = MockConfigRepository::new();
        configs.expect_find_by_key().returning(|_| Ok(None));
        configs
            .expect_create()
            .withf(|new| {
                new.config_key == "site_info"
                    && new.config_value == json!({"title": "Blog"})
                    && new.is_public
            })
            .returning(|new| Ok(entry(&new.config_key, new.config_value, new.is_public)));

        let outcome = service(configs)
            .upsert(upsert("site_info", Some(json!({"title": "Blog", "extra": 1}))))
            .await
            .unwrap();
        assert!(outcome.is_created());
        assert_eq!(outcome.into_entry().config_value["title"], "Blog");
    }

    #[tokio::test]
    async fn test_smtp_defaults_to_private() {
        let mut configs = MockConfigRepository::new();
        configs.expect_find_by_key().returning(|_| Ok(None));
        configs
            .expect_create()
            .withf(|new| !new.is_public)
            .returning(|new| Ok(entry(&new.config_key, new.config_value, new.is_public)));

        let value = json!({
            "enabled": true, "host": "smtp.example.com", "port": 465,
            "username": "mailer", "password": "pw"
        });
        let outcome = service(configs).upsert(upsert("smtp", Some(value))).await.unwrap();
        assert!(!outcome.into_entry().is_public);
    }

    #[tokio::test]
    async fn test_update_touches_only_supplied_fields() {
        let mut configs = MockConfigRepository::new();
        configs
            .expect_find_by_key()
            .returning(|_| Ok(Some(entry("site_info", json!({"title": "Old"}), true))));
        configs
            .expect_update_by_key()
            .with(
                eq("site_info"),
                eq(ConfigPatch {
                    config_value: None,
                    description: None,
                    is_public: Some(false),
                }),
            )
            .returning(|_, _| Ok(entry("site_info", json!({"title": "Old"}), false)));

        let input = ConfigUpsert {
            config_key: "site_info".into(),
            is_public: Some(false),
            ..Default::default()
        };
        let outcome = service(configs).upsert(input).await.unwrap();
        assert!(!outcome.is_created());

        let entry = outcome.into_entry();
        assert_eq!(entry.config_value, json!({"title": "Old"}));
        assert_eq!(entry.description.as_deref(), Some("original"));
    }

    #[tokio::test]
    async fn test_key_only_update_returns_existing_entry() {
        let mut configs = MockConfigRepository::new();
        configs
            .expect_find_by_key()
            .returning(|_| Ok(Some(entry("appearance", json!({"hue": 1}), true))));
        configs.expect_update_by_key().never();

        let outcome = service(configs).upsert(upsert("appearance", None)).await.unwrap();
        assert_eq!(outcome.into_entry().config_key, "appearance");
    }

    #[tokio::test]
    async fn test_schema_violation_never_reaches_storage() {
        let mut configs = MockConfigRepository::new();
        configs.expect_find_by_key().never();

        let err = service(configs)
            .upsert(upsert(
                "appearance",
                Some(json!({"theme": "dark", "hue": 999, "language": "en-US"})),
            ))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_unknown_key_is_rejected() {
        let mut configs = MockConfigRepository::new();
        configs.expect_find_by_key().never();

        let err = service(configs)
            .upsert(upsert("random", Some(json!({}))))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn test_private_entry_hidden_from_non_admin() {
        let mut configs = MockConfigRepository::new();
        configs
            .expect_find_by_key()
            .returning(|_| Ok(Some(entry("smtp", json!({}), false))));
        let svc = service(configs);

        let err = svc.get_by_key("smtp", false).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
        assert!(svc.get_by_key("smtp", true).await.is_ok());
    }

    #[tokio::test]
    async fn test_delete_missing_is_not_found() {
        let mut configs = MockConfigRepository::new();
        configs.expect_delete_by_key().returning(|_| Ok(false));

        let err = service(configs).delete("site_info").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
