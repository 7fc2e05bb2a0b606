//! API middleware.

mod auth;

pub use auth::{admin_guard, session_middleware, setup_guard};
