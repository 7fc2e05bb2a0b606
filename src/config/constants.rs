//! Application-wide constants
//!
//! Centralized location for magic values to improve maintainability.

// =============================================================================
// Filesystem layout
// =============================================================================

/// Default root directory for the database, env file and uploads
pub const DEFAULT_DATA_DIR: &str = "data";

/// Generated environment file name, relative to the data directory
pub const ENV_FILE_NAME: &str = ".env";

/// SQLite database file name, relative to the data directory
pub const DATABASE_FILE_NAME: &str = "sqlite.db";

/// Uploads directory, relative to the data directory
pub const UPLOADS_DIR_NAME: &str = "uploads";

/// System assets directory, relative to the uploads directory
pub const SYSTEM_ASSETS_DIR_NAME: &str = "system";

/// Public URL prefix under which the uploads directory is served
pub const UPLOADS_URL_PREFIX: &str = "/api/uploads";

// =============================================================================
// Authentication & Security
// =============================================================================

/// Default session lifetime in hours (7 days)
pub const DEFAULT_JWT_EXPIRATION_HOURS: i64 = 168;

/// Upper bound for a configured session lifetime (one year)
pub const MAX_JWT_EXPIRATION_HOURS: i64 = 24 * 365;

/// Minimum JWT secret length (security requirement)
pub const MIN_JWT_SECRET_LENGTH: usize = 32;

/// Random bytes used for an auto-generated JWT secret (hex encoded to 64 chars)
pub const GENERATED_SECRET_BYTES: usize = 32;

/// Seconds per hour (for token expiration calculation)
pub const SECONDS_PER_HOUR: i64 = 3600;

/// Name of the session cookie carrying the JWT
pub const SESSION_COOKIE_NAME: &str = "auth_token";

// =============================================================================
// User Roles & Statuses
// =============================================================================

/// Default role assigned to new users
pub const ROLE_USER: &str = "user";

/// Administrator role with elevated privileges
pub const ROLE_ADMIN: &str = "admin";

pub const STATUS_ACTIVE: &str = "active";
pub const STATUS_INACTIVE: &str = "inactive";
pub const STATUS_BANNED: &str = "banned";

// =============================================================================
// Server Configuration
// =============================================================================

/// Default server host address
pub const DEFAULT_SERVER_HOST: &str = "0.0.0.0";

/// Default server port
pub const DEFAULT_SERVER_PORT: u16 = 3000;

/// Prefix shared by every API route
pub const API_PREFIX: &str = "/api";

// =============================================================================
// Uploads
// =============================================================================

/// Favicon upload cap (1 MB)
pub const MAX_ICON_BYTES: usize = 1024 * 1024;

/// Hero banner upload cap (5 MB)
pub const MAX_HERO_BYTES: usize = 5 * 1024 * 1024;

/// Avatar upload cap (2 MB)
pub const MAX_AVATAR_BYTES: usize = 2 * 1024 * 1024;

/// Extra request body allowance for multipart framing on upload routes
pub const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

/// Edge length of the square box a favicon is fit into
pub const FAVICON_EDGE_PX: u32 = 128;

/// Quality used for lossy re-encoding of system assets
pub const LOSSY_QUALITY: u8 = 85;

// =============================================================================
// SMTP
// =============================================================================

/// Connection timeout for SMTP probes, in seconds
pub const SMTP_TIMEOUT_SECONDS: u64 = 10;

/// Port on which SMTP uses implicit TLS
pub const SMTP_IMPLICIT_TLS_PORT: u16 = 465;

/// Port on which STARTTLS is required
pub const SMTP_STARTTLS_PORT: u16 = 587;

// =============================================================================
// Validation
// =============================================================================

/// Minimum password length requirement
pub const MIN_PASSWORD_LENGTH: u64 = 6;

/// Maximum password length
pub const MAX_PASSWORD_LENGTH: u64 = 50;

