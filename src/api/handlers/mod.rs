//! HTTP request handlers.

pub mod auth_handler;
pub mod config_handler;
pub mod email_handler;
pub mod health_handler;

pub use auth_handler::auth_routes;
pub use config_handler::config_routes;
pub use email_handler::email_routes;
pub use health_handler::health_routes;
