//! User repository implementation.

use async_trait::async_trait;
use sea_orm::{
    sea_query::Condition, ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, Set, SqlErr,
};
use uuid::Uuid;

use super::entities::user::{self, ActiveModel, Entity as UserEntity};
use crate::config::{ROLE_ADMIN, STATUS_ACTIVE};
use crate::domain::User;
use crate::errors::{AppError, AppResult, OptionExt};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// User repository trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find user by ID
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>>;

    /// Find user whose username or email equals `identifier`
    async fn find_by_identifier(&self, identifier: &str) -> AppResult<Option<User>>;

    /// Whether any user already holds this username or this email
    async fn exists_by_username_or_email(&self, username: &str, email: &str) -> AppResult<bool>;

    /// Whether at least one admin account exists
    async fn has_admin(&self) -> AppResult<bool>;

    /// Insert a new user. A uniqueness violation maps to `Conflict`.
    async fn create(&self, user: User) -> AppResult<User>;

    /// Flip status to `active`
    async fn activate(&self, id: Uuid) -> AppResult<()>;

    /// Stamp `last_login_at` with the current time
    async fn touch_last_login(&self, id: Uuid) -> AppResult<User>;

    /// Point the user's avatar at a new URL
    async fn update_avatar(&self, id: Uuid, avatar_url: String) -> AppResult<()>;
}

/// Concrete implementation of UserRepository
pub struct UserStore {
    db: DatabaseConnection,
}

impl UserStore {
    /// Create new repository instance
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn find_model(&self, id: Uuid) -> AppResult<user::Model> {
        UserEntity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_not_found("User")
    }
}

fn map_insert_error(err: DbErr) -> AppError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => AppError::conflict("Username or email"),
        _ => AppError::from(err),
    }
}

#[async_trait]
impl UserRepository for UserStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        let result = UserEntity::find_by_id(id).one(&self.db).await?;
        Ok(result.map(User::from))
    }

    async fn find_by_identifier(&self, identifier: &str) -> AppResult<Option<User>> {
        let result = UserEntity::find()
            .filter(
                Condition::any()
                    .add(user::Column::Username.eq(identifier))
                    .add(user::Column::Email.eq(identifier)),
            )
            .one(&self.db)
            .await?;

        Ok(result.map(User::from))
    }

    async fn exists_by_username_or_email(&self, username: &str, email: &str) -> AppResult<bool> {
        let count = UserEntity::find()
            .filter(
                Condition::any()
                    .add(user::Column::Username.eq(username))
                    .add(user::Column::Email.eq(email)),
            )
            .count(&self.db)
            .await?;

        Ok(count > 0)
    }

    async fn has_admin(&self) -> AppResult<bool> {
        let count = UserEntity::find()
            .filter(user::Column::Role.eq(ROLE_ADMIN))
            .count(&self.db)
            .await?;

        Ok(count > 0)
    }

    async fn create(&self, user: User) -> AppResult<User> {
        let active_model = ActiveModel {
            id: Set(user.id),
            username: Set(user.username),
            email: Set(user.email),
            password_hash: Set(user.password_hash),
            avatar_url: Set(user.avatar_url),
            role: Set(user.role.to_string()),
            status: Set(user.status.as_str().to_string()),
            created_at: Set(user.created_at),
            updated_at: Set(user.updated_at),
            last_login_at: Set(user.last_login_at),
        };

        let model = active_model
            .insert(&self.db)
            .await
            .map_err(map_insert_error)?;
        Ok(User::from(model))
    }

    async fn activate(&self, id: Uuid) -> AppResult<()> {
        let mut active: ActiveModel = self.find_model(id).await?.into();
        active.status = Set(STATUS_ACTIVE.to_string());
        active.updated_at = Set(chrono::Utc::now());

        active.update(&self.db).await?;
        Ok(())
    }

    async fn touch_last_login(&self, id: Uuid) -> AppResult<User> {
        let mut active: ActiveModel = self.find_model(id).await?.into();
        active.last_login_at = Set(Some(chrono::Utc::now()));

        let model = active.update(&self.db).await?;
        Ok(User::from(model))
    }

    async fn update_avatar(&self, id: Uuid, avatar_url: String) -> AppResult<()> {
        let mut active: ActiveModel = self.find_model(id).await?.into();
        active.avatar_url = Set(Some(avatar_url));
        active.updated_at = Set(chrono::Utc::now());

        active.update(&self.db).await?;
        Ok(())
    }
}
