//! ohmyblog - Personal blog backend
//!
//! Account registration and cookie sessions, a keyed store of validated
//! site settings, and fixed-name image assets, served over a JSON API.
//!
//! # Architecture Layers
//!
//! - **cli**: Command-line interface
//! - **commands**: CLI command implementations
//! - **config**: Data directory, env file and constants
//! - **domain**: Users, passwords and site setting schemas
//! - **services**: Authentication, configuration, uploads and SMTP checks
//! - **infra**: Database, repositories, image transcoding and SMTP transport
//! - **api**: HTTP handlers, middleware, and routes
//! - **types**: Response envelopes
//! - **errors**: Centralized error handling
//!
//! # CLI Usage
//!
//! ```bash
//! # Start the server
//! cargo run -- serve
//!
//! # Use another data directory
//! cargo run -- --data-dir /srv/blog serve --port 8080
//!
//! # Show migration status
//! cargo run -- migrate status
//! ```

pub mod api;
pub mod cli;
pub mod commands;
pub mod config;
pub mod domain;
pub mod errors;
pub mod infra;
pub mod services;
pub mod types;

// Re-export commonly used types at crate root
pub use api::AppState;
pub use config::Config;
pub use domain::{Password, User, UserRole};
pub use errors::{AppError, AppResult};
