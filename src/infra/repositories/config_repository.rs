//! Site configuration repository.

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, NotSet, QueryFilter,
    QueryOrder, Set, SqlErr,
};

use super::entities::config::{self, ActiveModel, Entity as ConfigEntity};
use crate::domain::{ConfigEntry, ConfigPatch, NewConfigEntry};
use crate::errors::{AppError, AppResult, OptionExt};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait ConfigRepository: Send + Sync {
    async fn find_by_key(&self, key: &str) -> AppResult<Option<ConfigEntry>>;

    /// Insert a new entry. A duplicate key maps to `Conflict`.
    async fn create(&self, entry: NewConfigEntry) -> AppResult<ConfigEntry>;

    /// Overwrite the supplied fields of an existing entry
    async fn update_by_key(&self, key: &str, patch: ConfigPatch) -> AppResult<ConfigEntry>;

    /// Returns `false` when no entry had this key
    async fn delete_by_key(&self, key: &str) -> AppResult<bool>;

    /// All entries ordered by key, optionally only the public ones
    async fn list(&self, public_only: bool) -> AppResult<Vec<ConfigEntry>>;
}

pub struct ConfigStore {
    db: DatabaseConnection,
}

impl ConfigStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn map_insert_error(err: DbErr) -> AppError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => AppError::conflict("Config key"),
        _ => AppError::from(err),
    }
}

#[async_trait]
impl ConfigRepository for ConfigStore {
    async fn find_by_key(&self, key: &str) -> AppResult<Option<ConfigEntry>> {
        let result = ConfigEntity::find()
            .filter(config::Column::ConfigKey.eq(key))
            .one(&self.db)
            .await?;

        Ok(result.map(ConfigEntry::from))
    }

    async fn create(&self, entry: NewConfigEntry) -> AppResult<ConfigEntry> {
        let now = chrono::Utc::now();
        let active_model = ActiveModel {
            id: NotSet,
            config_key: Set(entry.config_key),
            config_value: Set(entry.config_value),
            description: Set(entry.description),
            is_public: Set(entry.is_public),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let model = active_model
            .insert(&self.db)
            .await
            .map_err(map_insert_error)?;
        Ok(ConfigEntry::from(model))
    }

    async fn update_by_key(&self, key: &str, patch: ConfigPatch) -> AppResult<ConfigEntry> {
        let model = ConfigEntity::find()
            .filter(config::Column::ConfigKey.eq(key))
            .one(&self.db)
            .await?
            .ok_or_not_found("Config")?;

        let mut active: ActiveModel = model.into();

        if let Some(value) = patch.config_value {
            active.config_value = Set(value);
        }
        if let Some(description) = patch.description {
            active.description = Set(Some(description));
        }
        if let Some(is_public) = patch.is_public {
            active.is_public = Set(is_public);
        }
        active.updated_at = Set(chrono::Utc::now());

        let model = active.update(&self.db).await?;
        Ok(ConfigEntry::from(model))
    }

    async fn delete_by_key(&self, key: &str) -> AppResult<bool> {
        let result = ConfigEntity::delete_many()
            .filter(config::Column::ConfigKey.eq(key))
            .exec(&self.db)
            .await?;

        Ok(result.rows_affected > 0)
    }

    async fn list(&self, public_only: bool) -> AppResult<Vec<ConfigEntry>> {
        let mut query = ConfigEntity::find().order_by_asc(config::Column::ConfigKey);
        if public_only {
            query = query.filter(config::Column::IsPublic.eq(true));
        }

        let models = query.all(&self.db).await?;
        Ok(models.into_iter().map(ConfigEntry::from).collect())
    }
}
