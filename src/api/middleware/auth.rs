//! Session and role middleware.

use axum::{
    extract::{Request, State},
    http::header::SET_COOKIE,
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::CookieJar;

use crate::api::cookie::expired_session_cookie;
use crate::api::extractors::{CurrentUser, RequestContext};
use crate::api::AppState;
use crate::config::SESSION_COOKIE_NAME;
use crate::domain::UserRole;
use crate::errors::{AppError, SessionRejected};

/// Decode the session cookie once per request.
///
/// Always inserts a `RequestContext` into the request extensions. A missing
/// cookie means an anonymous caller; an invalid or expired one is treated the
/// same and is cleared on the way out. Responses marked `SessionRejected`
/// also clear the cookie.
pub async fn session_middleware(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    let mut stale_cookie = false;

    let context = match jar.get(SESSION_COOKIE_NAME) {
        None => RequestContext::anonymous(),
        Some(cookie) => match state.auth_service.verify_token(cookie.value()) {
            Ok(claims) => RequestContext::authenticated(CurrentUser {
                id: claims.sub,
                username: claims.username,
                role: UserRole::from(claims.role.as_str()),
            }),
            Err(e) => {
                tracing::debug!(error = %e, "Discarding invalid session cookie");
                stale_cookie = true;
                RequestContext::anonymous()
            }
        },
    };

    request.extensions_mut().insert(context);
    let response = next.run(request).await;

    let rejected = response.extensions().get::<SessionRejected>().is_some();
    if (stale_cookie || rejected) && !sets_session_cookie(&response) {
        return (jar.add(expired_session_cookie()), response).into_response();
    }
    response
}

fn sets_session_cookie(response: &Response) -> bool {
    let prefix = format!("{}=", SESSION_COOKIE_NAME);
    response
        .headers()
        .get_all(SET_COOKIE)
        .iter()
        .any(|value| value.to_str().is_ok_and(|v| v.starts_with(&prefix)))
}

/// Route guard: caller must be an admin.
pub async fn admin_guard(
    context: RequestContext,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    context.require_role(UserRole::Admin)?;
    Ok(next.run(request).await)
}

/// Route guard for first-time setup routes.
///
/// Open to anyone until the first admin account exists, admin-only after.
pub async fn setup_guard(
    State(state): State<AppState>,
    context: RequestContext,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    if state.auth_service.admin_exists().await? {
        context.require_role(UserRole::Admin)?;
    } else {
        tracing::debug!(path = %request.uri().path(), "No admin yet, allowing setup request");
    }

    Ok(next.run(request).await)
}
