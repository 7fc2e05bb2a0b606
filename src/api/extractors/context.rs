//! Request-scoped identity.
//!
//! The session middleware decodes the cookie once per request and stores a
//! `RequestContext` in the request extensions. Handlers take it as an
//! argument to learn who is calling.

use std::convert::Infallible;

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use uuid::Uuid;

use crate::domain::UserRole;
use crate::errors::{AppError, AppResult};

/// Identity carried by a valid session token
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CurrentUser {
    pub id: Uuid,
    pub username: String,
    pub role: UserRole,
}

impl CurrentUser {
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

/// Per-request context; `user` is `None` for anonymous callers
#[derive(Clone, Debug, Default)]
pub struct RequestContext {
    pub user: Option<CurrentUser>,
}

impl RequestContext {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn authenticated(user: CurrentUser) -> Self {
        Self { user: Some(user) }
    }

    /// The caller, or `Unauthorized` when there is no valid session
    pub fn require_user(&self) -> AppResult<&CurrentUser> {
        self.user.as_ref().ok_or(AppError::Unauthorized)
    }

    /// Admin satisfies any requirement.
    pub fn require_role(&self, required: UserRole) -> AppResult<&CurrentUser> {
        let user = self.require_user()?;
        if user.role.can_access(&required) {
            Ok(user)
        } else {
            Err(AppError::Forbidden)
        }
    }

    pub fn is_admin(&self) -> bool {
        self.user.as_ref().is_some_and(CurrentUser::is_admin)
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for RequestContext
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts
            .extensions
            .get::<RequestContext>()
            .cloned()
            .unwrap_or_default())
    }
}
