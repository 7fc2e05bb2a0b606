//! Site configuration and asset upload handlers.

use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        DefaultBodyLimit, Multipart, Path, State,
    },
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Router,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::api::extractors::{RequestContext, ValidatedJson};
use crate::api::middleware::{admin_guard, setup_guard};
use crate::api::AppState;
use crate::config::MULTIPART_OVERHEAD_BYTES;
use crate::domain::{ConfigEntry, ConfigUpsert};
use crate::errors::{AppError, AppResult};
use crate::services::SystemAsset;
use crate::types::{ApiResponse, Created, MessageResponse};

/// A single configuration entry
#[derive(Debug, Serialize, ToSchema)]
pub struct ConfigResponse {
    #[schema(example = "Saved")]
    pub message: String,
    pub config: ConfigEntry,
}

/// Visible configuration entries
#[derive(Debug, Serialize, ToSchema)]
pub struct ConfigListResponse {
    pub configs: Vec<ConfigEntry>,
}

/// Stored asset location
#[derive(Debug, Serialize, ToSchema)]
pub struct UploadResponse {
    #[schema(example = "Icon uploaded")]
    pub message: String,
    #[schema(example = "/api/uploads/system/favicon.png")]
    pub url: String,
}

/// Multipart form for the favicon
#[derive(ToSchema)]
#[allow(dead_code)]
pub struct IconUpload {
    #[schema(value_type = String, format = Binary)]
    pub icon: Vec<u8>,
}

/// Multipart form for the hero banner
#[derive(ToSchema)]
#[allow(dead_code)]
pub struct HeroUpload {
    #[schema(value_type = String, format = Binary)]
    pub hero: Vec<u8>,
}

/// Multipart form for the avatar
#[derive(ToSchema)]
#[allow(dead_code)]
pub struct AvatarUpload {
    #[schema(value_type = String, format = Binary)]
    pub avatar: Vec<u8>,
}

/// Create configuration routes
///
/// Reads are public (visibility-gated), writes are open during first-time
/// setup and admin-only afterwards, deletion is always admin-only.
pub fn config_routes(state: AppState) -> Router<AppState> {
    let public = Router::new()
        .route("/", get(list_configs))
        .route("/:key", get(get_config));

    let setup = Router::new()
        .route("/", post(upsert_config))
        .route("/upload-icon", upload_route(SystemAsset::Favicon, upload_icon))
        .route("/upload-hero", upload_route(SystemAsset::Hero, upload_hero))
        .route("/upload-avatar", upload_route(SystemAsset::Avatar, upload_avatar))
        .route_layer(middleware::from_fn_with_state(state, setup_guard));

    let admin = Router::new()
        .route("/:key", delete(delete_config))
        .route_layer(middleware::from_fn(admin_guard));

    public.merge(setup).merge(admin)
}

fn upload_route<H, T>(asset: SystemAsset, handler: H) -> axum::routing::MethodRouter<AppState>
where
    H: axum::handler::Handler<T, AppState>,
    T: 'static,
{
    post(handler).layer(DefaultBodyLimit::max(
        asset.max_bytes() + MULTIPART_OVERHEAD_BYTES,
    ))
}

/// Create or update a configuration entry
///
/// Creates the entry when the key is new (`configValue` required, 201) and
/// otherwise overwrites only the supplied fields (200).
#[utoipa::path(
    post,
    path = "/api/config",
    tag = "Config",
    request_body = ConfigUpsert,
    responses(
        (status = 201, description = "Config created", body = ConfigResponse),
        (status = 200, description = "Config updated", body = ConfigResponse),
        (status = 400, description = "Unknown key, missing value or schema violation"),
        (status = 401, description = "Not logged in"),
        (status = 403, description = "Admin required once an admin exists")
    ),
    security(("cookie_auth" = []))
)]
pub async fn upsert_config(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<ConfigUpsert>,
) -> AppResult<Response> {
    let outcome = state.config_service.upsert(payload).await?;
    let created = outcome.is_created();
    let body = ConfigResponse {
        message: "Saved".to_string(),
        config: outcome.into_entry(),
    };

    Ok(if created {
        Created(body).into_response()
    } else {
        ApiResponse::success(body).into_response()
    })
}

/// List configuration entries
///
/// Admins see every entry, everyone else only the public ones.
#[utoipa::path(
    get,
    path = "/api/config",
    tag = "Config",
    responses(
        (status = 200, description = "Visible entries", body = ConfigListResponse)
    )
)]
pub async fn list_configs(
    State(state): State<AppState>,
    context: RequestContext,
) -> AppResult<ApiResponse<ConfigListResponse>> {
    let configs = state.config_service.list(!context.is_admin()).await?;
    Ok(ApiResponse::success(ConfigListResponse { configs }))
}

/// Get a configuration entry
#[utoipa::path(
    get,
    path = "/api/config/{key}",
    tag = "Config",
    params(("key" = String, Path, description = "Config key", example = "site_info")),
    responses(
        (status = 200, description = "Config entry", body = ConfigResponse),
        (status = 404, description = "Not found, or private and caller is not admin")
    )
)]
pub async fn get_config(
    State(state): State<AppState>,
    context: RequestContext,
    Path(key): Path<String>,
) -> AppResult<ApiResponse<ConfigResponse>> {
    let config = state
        .config_service
        .get_by_key(&key, context.is_admin())
        .await?;

    Ok(ApiResponse::success(ConfigResponse {
        message: "OK".to_string(),
        config,
    }))
}

/// Delete a configuration entry
#[utoipa::path(
    delete,
    path = "/api/config/{key}",
    tag = "Config",
    params(("key" = String, Path, description = "Config key")),
    responses(
        (status = 200, description = "Config deleted", body = MessageResponse),
        (status = 401, description = "Not logged in"),
        (status = 403, description = "Admin only"),
        (status = 404, description = "Config not found")
    ),
    security(("cookie_auth" = []))
)]
pub async fn delete_config(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> AppResult<ApiResponse<MessageResponse>> {
    state.config_service.delete(&key).await?;
    Ok(ApiResponse::success(MessageResponse::new("Deleted")))
}

/// Upload the site favicon (multipart field `icon`, at most 1 MB)
#[utoipa::path(
    post,
    path = "/api/config/upload-icon",
    tag = "Config",
    request_body(content = IconUpload, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Stored as a PNG fit inside 128x128", body = UploadResponse),
        (status = 400, description = "Missing file or not an image"),
        (status = 413, description = "File too large"),
        (status = 500, description = "Image processing failed")
    ),
    security(("cookie_auth" = []))
)]
pub async fn upload_icon(
    State(state): State<AppState>,
    context: RequestContext,
    multipart: Result<Multipart, MultipartRejection>,
) -> AppResult<ApiResponse<UploadResponse>> {
    upload(state, context, multipart, SystemAsset::Favicon).await
}

/// Upload the home page hero banner (multipart field `hero`, at most 5 MB)
#[utoipa::path(
    post,
    path = "/api/config/upload-hero",
    tag = "Config",
    request_body(content = HeroUpload, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Stored as JPEG", body = UploadResponse),
        (status = 400, description = "Missing file or not an image"),
        (status = 413, description = "File too large"),
        (status = 500, description = "Image processing failed")
    ),
    security(("cookie_auth" = []))
)]
pub async fn upload_hero(
    State(state): State<AppState>,
    context: RequestContext,
    multipart: Result<Multipart, MultipartRejection>,
) -> AppResult<ApiResponse<UploadResponse>> {
    upload(state, context, multipart, SystemAsset::Hero).await
}

/// Upload the owner avatar (multipart field `avatar`, at most 2 MB)
///
/// A logged-in caller also gets their profile avatar pointed at the file.
#[utoipa::path(
    post,
    path = "/api/config/upload-avatar",
    tag = "Config",
    request_body(content = AvatarUpload, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Stored as JPEG", body = UploadResponse),
        (status = 400, description = "Missing file or not an image"),
        (status = 413, description = "File too large"),
        (status = 500, description = "Image processing failed")
    ),
    security(("cookie_auth" = []))
)]
pub async fn upload_avatar(
    State(state): State<AppState>,
    context: RequestContext,
    multipart: Result<Multipart, MultipartRejection>,
) -> AppResult<ApiResponse<UploadResponse>> {
    upload(state, context, multipart, SystemAsset::Avatar).await
}

async fn upload(
    state: AppState,
    context: RequestContext,
    multipart: Result<Multipart, MultipartRejection>,
    asset: SystemAsset,
) -> AppResult<ApiResponse<UploadResponse>> {
    let multipart = multipart.map_err(|e| AppError::bad_request(e.body_text()))?;
    let bytes = read_image_field(multipart, asset).await?;
    let owner = context.user.map(|user| user.id);

    let uploaded = state.upload_service.upload(asset, bytes, owner).await?;

    Ok(ApiResponse::success(UploadResponse {
        message: "Upload successful".to_string(),
        url: uploaded.url,
    }))
}

/// Pull the asset's file field out of the form.
async fn read_image_field(mut multipart: Multipart, asset: SystemAsset) -> AppResult<Vec<u8>> {
    let field_name = asset.field_name();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(field_name) {
            continue;
        }

        let is_image = field
            .content_type()
            .is_some_and(|content_type| content_type.starts_with("image/"));
        if !is_image {
            return Err(AppError::validation(field_name, "File must be an image"));
        }

        let bytes = field.bytes().await.map_err(multipart_error)?;
        return Ok(bytes.to_vec());
    }

    Err(AppError::validation(field_name, "File is required"))
}

fn multipart_error(err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge("Uploaded file is too large".to_string())
    } else {
        AppError::bad_request(err.body_text())
    }
}
