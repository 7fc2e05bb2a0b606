//! Centralized error handling.
//!
//! Provides a unified error type for the entire application,
//! with automatic HTTP response conversion into the error envelope
//! `{ "success": false, "data": { "message", "field"? } }`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;
use validator::{ValidationErrors, ValidationErrorsKind};

/// A single field-level validation failure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct FieldError {
    /// Dotted path of the offending field (e.g. `configValue.hue`)
    #[schema(example = "password")]
    pub field: String,
    #[schema(example = "Password must be 6-50 characters")]
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Response extension marking a rejected or missing session. The session
/// middleware expires the cookie on responses that carry it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionRejected;

/// Application error types
///
/// Business failures (auth, not found, conflicts, bad input) are expected
/// outcomes and never reach the error log; `Database`, `Internal` and
/// `Processing` are incidents.
#[derive(Error, Debug)]
pub enum AppError {
    // Authentication & Authorization
    #[error("Not logged in or session expired")]
    Unauthorized,

    #[error("Insufficient permission")]
    Forbidden,

    #[error("Invalid account or password")]
    InvalidCredentials,

    #[error("Account has been banned")]
    AccountBanned,

    // Resource errors
    #[error("{0} not found")]
    NotFound(String),

    #[error("{0} already exists")]
    Conflict(String),

    // Validation
    #[error("Request validation failed")]
    Validation(Vec<FieldError>),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    PayloadTooLarge(String),

    // Media processing (message is user-facing, cause is logged at the origin)
    #[error("{0}")]
    Processing(String),

    // External service errors
    #[error("Database error")]
    Database(#[from] sea_orm::DbErr),

    #[error("Authentication error")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    // Internal
    #[error("Internal server error")]
    Internal(String),
}

/// Error response body
#[derive(Debug, Serialize)]
struct ErrorResponse {
    success: bool,
    data: ErrorBody,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    field: Option<Vec<FieldError>>,
}

impl AppError {
    /// Get HTTP status code
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Unauthorized | AppError::InvalidCredentials | AppError::Jwt(_) => {
                StatusCode::UNAUTHORIZED
            }
            AppError::Forbidden | AppError::AccountBanned => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Validation(_) | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::Processing(_) | AppError::Database(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Get user-facing message (hides internal details)
    fn user_message(&self) -> String {
        match self {
            // Hide details for internal/security errors
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                "A database error occurred".to_string()
            }
            AppError::Jwt(e) => {
                tracing::error!("JWT error: {:?}", e);
                "Invalid or expired token".to_string()
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                "An internal error occurred".to_string()
            }

            // Use default message for others
            _ => self.to_string(),
        }
    }

    fn field_errors(&self) -> Option<Vec<FieldError>> {
        match self {
            AppError::Validation(fields) => Some(fields.clone()),
            _ => None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let clears_session = matches!(self, AppError::Unauthorized);
        let body = ErrorResponse {
            success: false,
            data: ErrorBody {
                message: self.user_message(),
                field: self.field_errors(),
            },
        };

        if status.is_client_error() {
            tracing::debug!(status = status.as_u16(), error = %self, "Request rejected");
        }

        let mut response = (status, Json(body)).into_response();
        if clears_session {
            response.extensions_mut().insert(SessionRejected);
        }
        response
    }
}

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        AppError::Validation(flatten_validation_errors(&errors, None))
    }
}

/// Flatten nested validator errors into `{field, message}` pairs with dotted paths.
pub fn flatten_validation_errors(
    errors: &ValidationErrors,
    prefix: Option<&str>,
) -> Vec<FieldError> {
    let mut out = Vec::new();
    collect_field_errors(errors, prefix, &mut out);
    out.sort_by(|a, b| a.field.cmp(&b.field));
    out
}

fn collect_field_errors(errors: &ValidationErrors, prefix: Option<&str>, out: &mut Vec<FieldError>) {
    for (field, kind) in errors.errors() {
        let field = camel_case(field);
        let path = match prefix {
            Some(p) => format!("{}.{}", p, field),
            None => field,
        };

        match kind {
            ValidationErrorsKind::Field(errs) => {
                out.extend(errs.iter().map(|e| {
                    let message = e
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("{} is invalid", path));
                    FieldError::new(path.clone(), message)
                }));
            }
            ValidationErrorsKind::Struct(inner) => collect_field_errors(inner, Some(&path), out),
            ValidationErrorsKind::List(items) => {
                for (index, inner) in items {
                    collect_field_errors(inner, Some(&format!("{}[{}]", path, index)), out);
                }
            }
        }
    }
}

/// Request bodies are camelCase on the wire; report paths the client can match.
fn camel_case(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper_next = false;
    for c in field.chars() {
        if c == '_' {
            upper_next = !out.is_empty();
        } else if upper_next {
            out.extend(c.to_uppercase());
            upper_next = false;
        } else {
            out.push(c);
        }
    }
    out
}

/// Result type alias
pub type AppResult<T> = Result<T, AppError>;

/// Extension trait for Option -> AppError conversion
pub trait OptionExt<T> {
    fn ok_or_not_found(self, entity: &str) -> AppResult<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_not_found(self, entity: &str) -> AppResult<T> {
        self.ok_or_else(|| AppError::not_found(entity))
    }
}

/// Convenience constructors
impl AppError {
    pub fn not_found(entity: impl Into<String>) -> Self {
        AppError::NotFound(entity.into())
    }

    pub fn conflict(entity: impl Into<String>) -> Self {
        AppError::Conflict(entity.into())
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        AppError::BadRequest(msg.into())
    }

    pub fn validation(field: impl Into<String>, msg: impl Into<String>) -> Self {
        AppError::Validation(vec![FieldError::new(field, msg)])
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        AppError::Internal(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[derive(Validate)]
    struct Sample {
        #[validate(length(min = 3, message = "too short"))]
        name: String,
        #[validate(range(min = 1, max = 10))]
        count: u32,
    }

    #[derive(Validate)]
    struct Outer {
        #[validate(length(min = 1, message = "required"))]
        display_name: String,
        #[validate(nested)]
        contact_links: Vec<Inner>,
    }

    #[derive(Validate)]
    struct Inner {
        #[validate(url(message = "bad url"))]
        target_url: String,
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(AppError::Unauthorized.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::InvalidCredentials.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::AccountBanned.status(), StatusCode::FORBIDDEN);
        assert_eq!(AppError::not_found("Config").status(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::conflict("User").status(), StatusCode::CONFLICT);
        assert_eq!(
            AppError::PayloadTooLarge("big".into()).status(),
            StatusCode::PAYLOAD_TOO_LARGE
        );
        assert_eq!(
            AppError::Processing("retry".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_internal_message_is_sanitized() {
        let err = AppError::internal("disk on fire at /var/lib");
        assert_eq!(err.user_message(), "An internal error occurred");
    }

    #[test]
    fn test_validation_errors_are_flattened() {
        let sample = Sample {
            name: "ab".into(),
            count: 0,
        };
        let err = AppError::from(sample.validate().unwrap_err());
        let AppError::Validation(fields) = err else {
            panic!("expected validation error");
        };
        assert_eq!(fields.len(), 2);
        assert_eq!(fields[0].field, "count");
        assert_eq!(fields[0].message, "count is invalid");
        assert_eq!(fields[1], FieldError::new("name", "too short"));
    }

    #[test]
    fn test_field_paths_use_wire_names() {
        let outer = Outer {
            display_name: String::new(),
            contact_links: vec![Inner {
                target_url: "nope".into(),
            }],
        };
        let fields = flatten_validation_errors(&outer.validate().unwrap_err(), Some("configValue"));
        let paths: Vec<&str> = fields.iter().map(|f| f.field.as_str()).collect();
        assert_eq!(
            paths,
            vec!["configValue.contactLinks[0].targetUrl", "configValue.displayName"]
        );
    }

    #[test]
    fn test_camel_case() {
        assert_eq!(camel_case("sender_email"), "senderEmail");
        assert_eq!(camel_case("hue"), "hue");
        assert_eq!(camel_case("_private"), "private");
    }

    #[test]
    fn test_unauthorized_response_is_marked() {
        let response = AppError::Unauthorized.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(response.extensions().get::<SessionRejected>().is_some());
    }

    #[test]
    fn test_other_errors_are_not_marked() {
        for err in [AppError::Forbidden, AppError::InvalidCredentials] {
            let response = err.into_response();
            assert!(response.extensions().get::<SessionRejected>().is_none());
        }
    }
}
