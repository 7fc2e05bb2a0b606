//! User domain entity and related types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::config::{ROLE_ADMIN, ROLE_USER, STATUS_ACTIVE, STATUS_BANNED, STATUS_INACTIVE};

/// User roles enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    User,
    Admin,
}

impl UserRole {
    /// Check if this role has admin privileges
    pub fn is_admin(&self) -> bool {
        matches!(self, UserRole::Admin)
    }

    /// Check if this role can access a required role.
    /// Admin satisfies every requirement.
    pub fn can_access(&self, required: &UserRole) -> bool {
        match self {
            UserRole::Admin => true,
            UserRole::User => matches!(required, UserRole::User),
        }
    }
}

impl From<&str> for UserRole {
    fn from(s: &str) -> Self {
        match s {
            ROLE_ADMIN => UserRole::Admin,
            _ => UserRole::User,
        }
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UserRole::Admin => write!(f, "{}", ROLE_ADMIN),
            UserRole::User => write!(f, "{}", ROLE_USER),
        }
    }
}

/// Account status.
///
/// `inactive -> active` on first successful login; `banned` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
    Active,
    Inactive,
    Banned,
}

impl UserStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserStatus::Active => STATUS_ACTIVE,
            UserStatus::Inactive => STATUS_INACTIVE,
            UserStatus::Banned => STATUS_BANNED,
        }
    }
}

impl From<&str> for UserStatus {
    fn from(s: &str) -> Self {
        match s {
            STATUS_ACTIVE => UserStatus::Active,
            STATUS_BANNED => UserStatus::Banned,
            _ => UserStatus::Inactive,
        }
    }
}

impl std::fmt::Display for UserStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// User domain entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub avatar_url: Option<String>,
    pub role: UserRole,
    pub status: UserStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub last_login_at: Option<DateTime<Utc>>,
}

impl User {
    /// Create a new, not yet activated user
    pub fn new(username: String, email: String, password_hash: String, role: UserRole) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            username,
            email,
            password_hash,
            avatar_url: None,
            role,
            status: UserStatus::Inactive,
            created_at: now,
            updated_at: now,
            last_login_at: None,
        }
    }

    /// Check if user has admin role
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    pub fn is_banned(&self) -> bool {
        self.status == UserStatus::Banned
    }

    /// Whether the next successful login is the activating one
    pub fn needs_activation(&self) -> bool {
        self.status == UserStatus::Inactive
    }
}

/// User summary (safe to return to client)
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    /// Unique user identifier
    #[schema(example = "550e8400-e29b-41d4-a716-446655440000")]
    pub id: Uuid,
    #[schema(example = "zhangsan")]
    pub username: String,
    #[schema(example = "user@example.com")]
    pub email: String,
    #[schema(example = "admin")]
    pub role: UserRole,
    #[schema(example = "active")]
    pub status: UserStatus,
    #[schema(example = "/api/uploads/system/avatar.jpg")]
    pub avatar_url: Option<String>,
    /// Account creation timestamp
    pub created_at: DateTime<Utc>,
    pub last_login_at: Option<DateTime<Utc>>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            role: user.role,
            status: user.status,
            avatar_url: user.avatar_url,
            created_at: user.created_at,
            last_login_at: user.last_login_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admin_satisfies_any_role() {
        assert!(UserRole::Admin.can_access(&UserRole::Admin));
        assert!(UserRole::Admin.can_access(&UserRole::User));
        assert!(UserRole::User.can_access(&UserRole::User));
        assert!(!UserRole::User.can_access(&UserRole::Admin));
    }

    #[test]
    fn test_role_and_status_parsing() {
        assert_eq!(UserRole::from("admin"), UserRole::Admin);
        assert_eq!(UserRole::from("anything"), UserRole::User);
        assert_eq!(UserStatus::from("banned"), UserStatus::Banned);
        assert_eq!(UserStatus::from("active"), UserStatus::Active);
        assert_eq!(UserStatus::from("weird"), UserStatus::Inactive);
        assert_eq!(UserStatus::Banned.to_string(), "banned");
    }

    #[test]
    fn test_new_user_starts_inactive() {
        let user = User::new("alice".into(), "a@example.com".into(), "hash".into(), UserRole::Admin);
        assert!(user.needs_activation());
        assert!(user.is_admin());
        assert!(user.last_login_at.is_none());
    }

    #[test]
    fn test_serialized_user_hides_hash() {
        let user = User::new("alice".into(), "a@example.com".into(), "secret-hash".into(), UserRole::User);
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("secret-hash"));
        assert!(json.contains("\"avatarUrl\":null"));

        let summary = serde_json::to_value(UserResponse::from(user)).unwrap();
        assert_eq!(summary["role"], "user");
        assert_eq!(summary["status"], "inactive");
        assert!(summary.get("passwordHash").is_none());
    }
}
