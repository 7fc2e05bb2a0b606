//! Session cookie construction.
//!
//! The session JWT travels only in an HTTP-only, SameSite=Lax cookie so it is
//! never readable from page script.

use axum_extra::extract::cookie::{Cookie, SameSite};
use time::Duration;

use crate::config::SESSION_COOKIE_NAME;

/// Cookie carrying a freshly issued session token.
pub fn session_cookie(token: String, ttl_seconds: i64, secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE_NAME, token))
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .path("/")
        .max_age(Duration::seconds(ttl_seconds))
        .build()
}

/// Cookie that makes the browser drop the session cookie immediately.
pub fn expired_session_cookie() -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE_NAME, ""))
        .http_only(true)
        .same_site(SameSite::Lax)
        .path("/")
        .max_age(Duration::ZERO)
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_cookie_attributes() {
        let cookie = session_cookie("abc.def.ghi".to_string(), 3600, false).to_string();
        assert!(cookie.starts_with("auth_token=abc.def.ghi"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("SameSite=Lax"));
        assert!(cookie.contains("Path=/"));
        assert!(cookie.contains("Max-Age=3600"));
        assert!(!cookie.contains("Secure"));
    }

    #[test]
    fn test_secure_flag_is_optional() {
        let cookie = session_cookie("token".to_string(), 60, true).to_string();
        assert!(cookie.contains("Secure"));
    }

    #[test]
    fn test_expired_cookie_has_zero_max_age() {
        let cookie = expired_session_cookie().to_string();
        assert!(cookie.starts_with("auth_token=;"));
        assert!(cookie.contains("Max-Age=0"));
    }
}
