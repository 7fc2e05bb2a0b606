//! Authentication handlers.

use axum::{
    extract::State,
    routing::{get, post},
    Router,
};
use axum_extra::extract::CookieJar;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::api::cookie::{expired_session_cookie, session_cookie};
use crate::api::extractors::{RequestContext, ValidatedJson};
use crate::api::AppState;
use crate::domain::UserResponse;
use crate::errors::AppResult;
use crate::types::{ApiResponse, Created, MessageResponse};

/// User registration request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegisterRequest {
    #[validate(length(min = 3, max = 50, message = "Username must be 3-50 characters"))]
    #[schema(example = "zhangsan", min_length = 3, max_length = 50)]
    pub username: String,
    #[validate(email(message = "Invalid email format"))]
    #[schema(example = "user@example.com")]
    pub email: String,
    #[validate(length(min = 6, max = 50, message = "Password must be 6-50 characters"))]
    #[schema(example = "SecurePass123", min_length = 6, max_length = 50)]
    pub password: String,
}

/// User login request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    /// Username or email
    #[validate(length(min = 1, message = "Username or email is required"))]
    #[schema(example = "zhangsan")]
    pub identifier: String,
    #[validate(length(min = 1, message = "Password is required"))]
    #[schema(example = "SecurePass123")]
    pub password: String,
}

/// Register/login response payload
#[derive(Debug, Serialize, ToSchema)]
pub struct AuthResponse {
    #[schema(example = "Login successful")]
    pub message: String,
    pub user: UserResponse,
}

/// Create authentication routes
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/me", get(me))
}

/// Register a new user
///
/// The first account registered on a fresh installation becomes admin.
#[utoipa::path(
    post,
    path = "/api/auth/register",
    tag = "Authentication",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User registered successfully", body = AuthResponse),
        (status = 400, description = "Validation error"),
        (status = 409, description = "Username or email already exists")
    )
)]
pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<RegisterRequest>,
) -> AppResult<Created<AuthResponse>> {
    let user = state
        .auth_service
        .register(payload.username, payload.email, payload.password)
        .await?;

    Ok(Created(AuthResponse {
        message: "Registration successful".to_string(),
        user: UserResponse::from(user),
    }))
}

/// Log in and receive the session cookie
#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "Authentication",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful, session cookie set", body = AuthResponse),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Invalid account or password"),
        (status = 403, description = "Account has been banned")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    ValidatedJson(payload): ValidatedJson<LoginRequest>,
) -> AppResult<(CookieJar, ApiResponse<AuthResponse>)> {
    let user = state
        .auth_service
        .login(payload.identifier, payload.password)
        .await?;
    let token = state.auth_service.issue_token(&user)?;

    let cookie = session_cookie(
        token,
        state.config.session_ttl_seconds(),
        state.config.cookie_secure,
    );

    Ok((
        jar.add(cookie),
        ApiResponse::success(AuthResponse {
            message: "Login successful".to_string(),
            user: UserResponse::from(user),
        }),
    ))
}

/// Clear the session cookie
#[utoipa::path(
    post,
    path = "/api/auth/logout",
    tag = "Authentication",
    responses(
        (status = 200, description = "Logged out", body = MessageResponse)
    )
)]
pub async fn logout(jar: CookieJar) -> (CookieJar, ApiResponse<MessageResponse>) {
    (
        jar.add(expired_session_cookie()),
        ApiResponse::success(MessageResponse::new("Logged out")),
    )
}

/// Get the logged-in user
#[utoipa::path(
    get,
    path = "/api/auth/me",
    tag = "Authentication",
    responses(
        (status = 200, description = "Current user", body = UserResponse),
        (status = 401, description = "Not logged in or session expired"),
        (status = 404, description = "Account no longer exists")
    ),
    security(("cookie_auth" = []))
)]
pub async fn me(
    State(state): State<AppState>,
    context: RequestContext,
) -> AppResult<ApiResponse<UserResponse>> {
    let current = context.require_user()?;
    let user = state.auth_service.current_user(current.id).await?;

    Ok(ApiResponse::success(UserResponse::from(user)))
}
