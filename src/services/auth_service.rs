//! Authentication service - Registration, login and session tokens.
//!
//! Password hashing uses the domain `Password` value object and runs on the
//! blocking pool. Repository access goes through the Unit of Work.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use super::AdminPresence;
use crate::config::Config;
use crate::domain::{Password, User, UserRole};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::UnitOfWork;

/// JWT claims payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub username: String,
    pub role: String,
    pub exp: i64,
    pub iat: i64,
}

/// Authentication service trait for dependency injection.
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Create an account. The first account on a fresh system becomes admin.
    async fn register(&self, username: String, email: String, password: String) -> AppResult<User>;

    /// Authenticate by username or email
    async fn login(&self, identifier: String, password: String) -> AppResult<User>;

    /// Fetch the user behind a session
    async fn current_user(&self, id: Uuid) -> AppResult<User>;

    /// Whether any admin account exists yet
    async fn admin_exists(&self) -> AppResult<bool>;

    /// Sign a session token for the user
    fn issue_token(&self, user: &User) -> AppResult<String>;

    /// Verify JWT token and extract claims
    fn verify_token(&self, token: &str) -> AppResult<Claims>;
}

/// Concrete implementation of AuthService using Unit of Work.
pub struct Authenticator<U: UnitOfWork> {
    uow: Arc<U>,
    config: Config,
    admins: Arc<AdminPresence>,
}

impl<U: UnitOfWork> Authenticator<U> {
    pub fn new(uow: Arc<U>, config: Config, admins: Arc<AdminPresence>) -> Self {
        Self {
            uow,
            config,
            admins,
        }
    }
}

async fn hash_password(plain: String) -> AppResult<Password> {
    tokio::task::spawn_blocking(move || Password::new(&plain))
        .await
        .map_err(|e| AppError::internal(format!("Password hashing task failed: {}", e)))?
}

async fn verify_password(stored: Password, plain: String) -> AppResult<bool> {
    tokio::task::spawn_blocking(move || stored.verify(&plain))
        .await
        .map_err(|e| AppError::internal(format!("Password verification task failed: {}", e)))
}

#[async_trait]
impl<U: UnitOfWork> AuthService for Authenticator<U> {
    async fn register(&self, username: String, email: String, password: String) -> AppResult<User> {
        let users = self.uow.users();

        if users.exists_by_username_or_email(&username, &email).await? {
            return Err(AppError::conflict("Username or email"));
        }

        let password = hash_password(password).await?;
        let role = if self.admins.resolve(users.as_ref()).await? {
            UserRole::User
        } else {
            UserRole::Admin
        };

        let user = users
            .create(User::new(username, email, password.into_string(), role))
            .await?;

        if user.is_admin() {
            self.admins.mark_present();
        }

        tracing::info!(user_id = %user.id, username = %user.username, role = %user.role, "User registered");
        Ok(user)
    }

    async fn login(&self, identifier: String, password: String) -> AppResult<User> {
        let users = self.uow.users();
        let found = users.find_by_identifier(&identifier).await?;

        // Unknown identifiers are verified against a dummy hash so both
        // failure paths cost the same.
        let stored = match &found {
            Some(user) => Password::from_hash(user.password_hash.clone()),
            None => Password::dummy(),
        };
        let password_valid = verify_password(stored, password).await?;

        let user = match found {
            Some(user) if password_valid => user,
            _ => return Err(AppError::InvalidCredentials),
        };

        if user.is_banned() {
            tracing::warn!(user_id = %user.id, "Login attempt by banned user");
            return Err(AppError::AccountBanned);
        }

        if user.needs_activation() {
            users.activate(user.id).await?;
            tracing::info!(user_id = %user.id, "User activated on first login");
        }

        let user = users.touch_last_login(user.id).await?;
        tracing::info!(user_id = %user.id, "User logged in");
        Ok(user)
    }

    async fn current_user(&self, id: Uuid) -> AppResult<User> {
        self.uow.users().find_by_id(id).await?.ok_or_not_found("User")
    }

    async fn admin_exists(&self) -> AppResult<bool> {
        self.admins.resolve(self.uow.users().as_ref()).await
    }

    fn issue_token(&self, user: &User) -> AppResult<String> {
        let now = Utc::now();
        let expires_at = now + Duration::seconds(self.config.session_ttl_seconds());

        let claims = Claims {
            sub: user.id,
            username: user.username.clone(),
            role: user.role.to_string(),
            exp: expires_at.timestamp(),
            iat: now.timestamp(),
        };

        Ok(encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.config.jwt_secret_bytes()),
        )?)
    }

    fn verify_token(&self, token: &str) -> AppResult<Claims> {
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.config.jwt_secret_bytes()),
            &Validation::default(),
        )?;

        Ok(token_data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::UserStatus;
    use crate::infra::{MockConfigRepository, MockUserRepository, StaticUnitOfWork};
    use mockall::predicate::eq;

    const SECRET: &str = "test-secret-key-for-testing-only-32chars";

    fn service(users: MockUserRepository) -> (Authenticator<StaticUnitOfWork>, Arc<AdminPresence>) {
        let uow = Arc::new(StaticUnitOfWork {
            users: Arc::new(users),
            configs: Arc::new(MockConfigRepository::new()),
        });
        let admins = Arc::new(AdminPresence::new());
        let config = Config::new("data", SECRET).unwrap();
        (Authenticator::new(uow, config, admins.clone()), admins)
    }

    fn stored_user(password: &str, status: UserStatus) -> User {
        let hash = Password::new(password).unwrap().into_string();
        let mut user = User::new("alice".into(), "alice@example.com".into(), hash, UserRole::User);
        user.status = status;
        user
    }

    #[tokio::test]
    async fn test_first_registration_becomes_admin() {
        let mut users = MockUserRepository::new();
        users
            .expect_exists_by_username_or_email()
            .returning(|_, _| Ok(false));
        users.expect_has_admin().times(1).returning(|| Ok(false));
        users
            .expect_create()
            .withf(|u| u.role == UserRole::Admin && u.status == UserStatus::Inactive)
            .returning(Ok);

        let (auth, admins) = service(users);
        let user = auth
            .register("alice".into(), "alice@example.com".into(), "secret123".into())
            .await
            .unwrap();

        assert_eq!(user.role, UserRole::Admin);
        assert_ne!(user.password_hash, "secret123");
        assert!(admins.is_known_present());
    }

    #[tokio::test]
    async fn test_later_registration_is_plain_user() {
        let mut users = MockUserRepository::new();
        users
            .expect_exists_by_username_or_email()
            .returning(|_, _| Ok(false));
        users.expect_has_admin().never();
        users.expect_create().returning(Ok);

        let (auth, admins) = service(users);
        admins.mark_present();

        let user = auth
            .register("bob".into(), "bob@example.com".into(), "secret123".into())
            .await
            .unwrap();
        assert_eq!(user.role, UserRole::User);
    }

    #[tokio::test]
    async fn test_duplicate_registration_conflicts() {
        let mut users = MockUserRepository::new();
        users
            .expect_exists_by_username_or_email()
            .with(eq("alice"), eq("new@example.com"))
            .returning(|_, _| Ok(true));
        users.expect_create().never();

        let (auth, _) = service(users);
        let err = auth
            .register("alice".into(), "new@example.com".into(), "secret123".into())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_unknown_identifier_and_wrong_password_look_alike() {
        let user = stored_user("secret123", UserStatus::Active);
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_identifier()
            .with(eq("alice"))
            .returning(move |_| Ok(Some(user.clone())));
        users
            .expect_find_by_identifier()
            .with(eq("nobody"))
            .returning(|_| Ok(None));
        users.expect_touch_last_login().never();

        let (auth, _) = service(users);
        let wrong = auth.login("alice".into(), "wrong-pass".into()).await.unwrap_err();
        let unknown = auth.login("nobody".into(), "wrong-pass".into()).await.unwrap_err();

        assert!(matches!(wrong, AppError::InvalidCredentials));
        assert_eq!(wrong.to_string(), unknown.to_string());
        assert_eq!(wrong.status(), unknown.status());
    }

    #[tokio::test]
    async fn test_banned_user_is_forbidden_and_stays_banned() {
        let user = stored_user("secret123", UserStatus::Banned);
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_identifier()
            .returning(move |_| Ok(Some(user.clone())));
        users.expect_activate().never();
        users.expect_touch_last_login().never();

        let (auth, _) = service(users);
        let err = auth.login("alice".into(), "secret123".into()).await.unwrap_err();
        assert!(matches!(err, AppError::AccountBanned));
    }

    #[tokio::test]
    async fn test_first_login_activates() {
        let user = stored_user("secret123", UserStatus::Inactive);
        let id = user.id;
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_identifier()
            .returning(move |_| Ok(Some(user.clone())));
        users.expect_activate().with(eq(id)).times(1).returning(|_| Ok(()));
        users.expect_touch_last_login().with(eq(id)).returning(|_| {
            let mut user = stored_user("secret123", UserStatus::Active);
            user.last_login_at = Some(Utc::now());
            Ok(user)
        });

        let (auth, _) = service(users);
        let user = auth.login("alice".into(), "secret123".into()).await.unwrap();
        assert_eq!(user.status, UserStatus::Active);
        assert!(user.last_login_at.is_some());
    }

    #[tokio::test]
    async fn test_active_login_skips_activation() {
        let user = stored_user("secret123", UserStatus::Active);
        let returned = user.clone();
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_identifier()
            .returning(move |_| Ok(Some(user.clone())));
        users.expect_activate().never();
        users
            .expect_touch_last_login()
            .returning(move |_| Ok(returned.clone()));

        let (auth, _) = service(users);
        assert!(auth.login("alice@example.com".into(), "secret123".into()).await.is_ok());
    }

    #[tokio::test]
    async fn test_current_user_not_found() {
        let mut users = MockUserRepository::new();
        users.expect_find_by_id().returning(|_| Ok(None));

        let (auth, _) = service(users);
        let err = auth.current_user(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[test]
    fn test_token_round_trip_and_tampering() {
        let (auth, _) = service(MockUserRepository::new());
        let user = User::new("alice".into(), "a@example.com".into(), "h".into(), UserRole::Admin);

        let token = auth.issue_token(&user).unwrap();
        let claims = auth.verify_token(&token).unwrap();
        assert_eq!(claims.sub, user.id);
        assert_eq!(claims.username, "alice");
        assert_eq!(claims.role, "admin");
        assert_eq!(claims.exp - claims.iat, 7 * 24 * 3600);

        let tampered = format!("{}x", token);
        assert!(matches!(auth.verify_token(&tampered), Err(AppError::Jwt(_))));
    }
}
