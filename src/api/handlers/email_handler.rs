//! Email handlers.

use axum::{extract::State, middleware, routing::post, Router};

use crate::api::extractors::ValidatedJson;
use crate::api::middleware::admin_guard;
use crate::api::AppState;
use crate::domain::SmtpSettings;
use crate::errors::AppResult;
use crate::types::{ApiResponse, MessageResponse};

/// Create email routes (admin only)
pub fn email_routes() -> Router<AppState> {
    Router::new()
        .route("/test-smtp", post(test_smtp))
        .route_layer(middleware::from_fn(admin_guard))
}

/// Check that an SMTP server accepts the given settings
///
/// Nothing is sent; the session is opened, authenticated and closed.
#[utoipa::path(
    post,
    path = "/api/email/test-smtp",
    tag = "Email",
    request_body = SmtpSettings,
    responses(
        (status = 200, description = "Connection verified", body = MessageResponse),
        (status = 400, description = "Invalid settings or connection failed"),
        (status = 401, description = "Not logged in"),
        (status = 403, description = "Admin only")
    ),
    security(("cookie_auth" = []))
)]
pub async fn test_smtp(
    State(state): State<AppState>,
    ValidatedJson(settings): ValidatedJson<SmtpSettings>,
) -> AppResult<ApiResponse<MessageResponse>> {
    state.email_service.test_smtp(settings).await?;
    Ok(ApiResponse::success(MessageResponse::new(
        "SMTP connection successful",
    )))
}
