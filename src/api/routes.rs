//! Application route configuration.

use axum::{middleware, Router};
use tower_http::{services::ServeDir, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use super::handlers::{auth_routes, config_routes, email_routes, health_routes};
use super::middleware::session_middleware;
use super::openapi::ApiDoc;
use super::AppState;
use crate::config::API_PREFIX;

/// Create the application router with all routes configured
pub fn create_router(state: AppState) -> Router {
    let api = Router::new()
        .nest("/auth", auth_routes())
        .nest("/config", config_routes(state.clone()))
        .nest("/email", email_routes())
        .nest("/health", health_routes())
        // Uploaded assets, read-only
        .nest_service("/uploads", ServeDir::new(state.config.uploads_dir()));

    Router::new()
        // OpenAPI Swagger UI documentation
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .nest(API_PREFIX, api)
        // Global middleware: every request gets a RequestContext
        .layer(middleware::from_fn_with_state(
            state.clone(),
            session_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
