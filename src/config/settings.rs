//! Application settings loaded from the generated env file and the environment.

use std::env;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use argon2::password_hash::rand_core::{OsRng, RngCore};

use super::constants::{
    DATABASE_FILE_NAME, DEFAULT_JWT_EXPIRATION_HOURS, DEFAULT_SERVER_HOST, DEFAULT_SERVER_PORT,
    ENV_FILE_NAME, GENERATED_SECRET_BYTES, MAX_JWT_EXPIRATION_HOURS, MIN_JWT_SECRET_LENGTH,
    SECONDS_PER_HOUR, SYSTEM_ASSETS_DIR_NAME, UPLOADS_DIR_NAME,
};
use crate::errors::{AppError, AppResult};

/// Application configuration
#[derive(Clone)]
pub struct Config {
    pub data_dir: PathBuf,
    pub database_url: String,
    jwt_secret: String,
    pub jwt_expiration_hours: i64,
    pub server_host: String,
    pub server_port: u16,
    /// Adds the `Secure` attribute to the session cookie
    pub cookie_secure: bool,
    /// Reported by the health endpoint
    pub version: String,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("data_dir", &self.data_dir)
            .field("database_url", &"[REDACTED]")
            .field("jwt_secret", &"[REDACTED]")
            .field("jwt_expiration_hours", &self.jwt_expiration_hours)
            .field("server_host", &self.server_host)
            .field("server_port", &self.server_port)
            .field("cookie_secure", &self.cookie_secure)
            .field("version", &self.version)
            .finish()
    }
}

impl Config {
    /// Build a configuration rooted at `data_dir` with default tunables.
    ///
    /// # Errors
    /// Returns an error if the secret is shorter than the minimum length.
    pub fn new(data_dir: impl Into<PathBuf>, jwt_secret: impl Into<String>) -> AppResult<Self> {
        let data_dir = data_dir.into();
        let jwt_secret = jwt_secret.into();

        if jwt_secret.len() < MIN_JWT_SECRET_LENGTH {
            return Err(AppError::internal(format!(
                "JWT_SECRET must be at least {} characters long",
                MIN_JWT_SECRET_LENGTH
            )));
        }

        Ok(Self {
            database_url: sqlite_url(&data_dir.join(DATABASE_FILE_NAME)),
            data_dir,
            jwt_secret,
            jwt_expiration_hours: DEFAULT_JWT_EXPIRATION_HOURS,
            server_host: DEFAULT_SERVER_HOST.to_string(),
            server_port: DEFAULT_SERVER_PORT,
            cookie_secure: false,
            version: env!("CARGO_PKG_VERSION").to_string(),
        })
    }

    /// Load configuration for a data directory.
    ///
    /// Creates the directory layout and, on first run, an env file with a
    /// freshly generated signing secret. Values already present in the
    /// process environment take precedence over the file.
    pub fn load(data_dir: impl Into<PathBuf>) -> AppResult<Self> {
        let data_dir = data_dir.into();
        ensure_layout(&data_dir)?;

        let env_path = data_dir.join(ENV_FILE_NAME);
        if !env_path.exists() {
            tracing::warn!(path = %env_path.display(), "Env file not found, generating one");
            write_env_file(&env_path)?;
            tracing::info!(path = %env_path.display(), "Env file created with a generated JWT secret");
        }

        dotenvy::from_path(&env_path).map_err(|e| {
            AppError::internal(format!("Failed to read {}: {}", env_path.display(), e))
        })?;

        let jwt_secret =
            env::var("JWT_SECRET").map_err(|_| AppError::internal("JWT_SECRET is not set"))?;

        let mut config = Self::new(data_dir, jwt_secret)?;

        if let Ok(url) = env::var("DATABASE_URL") {
            config.database_url = url;
        }
        if let Ok(hours) = env::var("JWT_EXPIRATION_HOURS") {
            config.jwt_expiration_hours = parse_expiration_hours(&hours)?;
        }
        if let Ok(host) = env::var("SERVER_HOST") {
            config.server_host = host;
        }
        if let Some(port) = env::var("PORT").ok().and_then(|v| v.parse().ok()) {
            config.server_port = port;
        }
        config.cookie_secure = env::var("COOKIE_SECURE")
            .map(|v| v.eq_ignore_ascii_case("true") || v == "1")
            .unwrap_or(false);
        if let Ok(commit) = env::var("GIT_COMMIT") {
            if !commit.trim().is_empty() {
                config.version = commit.trim().to_string();
            }
        }

        Ok(config)
    }

    /// Get JWT secret bytes for token signing/verification.
    pub fn jwt_secret_bytes(&self) -> &[u8] {
        self.jwt_secret.as_bytes()
    }

    /// Session lifetime in seconds (token expiry and cookie Max-Age).
    pub fn session_ttl_seconds(&self) -> i64 {
        self.jwt_expiration_hours * SECONDS_PER_HOUR
    }

    /// Directory holding every uploaded file.
    pub fn uploads_dir(&self) -> PathBuf {
        self.data_dir.join(UPLOADS_DIR_NAME)
    }

    /// Directory holding the fixed-name system assets.
    pub fn system_assets_dir(&self) -> PathBuf {
        self.uploads_dir().join(SYSTEM_ASSETS_DIR_NAME)
    }

    /// Get the full server address.
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}

/// Session lifetime must be between one hour and `MAX_JWT_EXPIRATION_HOURS`.
fn parse_expiration_hours(raw: &str) -> AppResult<i64> {
    let invalid = || {
        AppError::internal(format!(
            "JWT_EXPIRATION_HOURS must be a whole number between 1 and {}, got '{}'",
            MAX_JWT_EXPIRATION_HOURS, raw
        ))
    };

    let hours: i64 = raw.trim().parse().map_err(|_| invalid())?;
    if (1..=MAX_JWT_EXPIRATION_HOURS).contains(&hours) {
        Ok(hours)
    } else {
        Err(invalid())
    }
}

fn sqlite_url(path: &Path) -> String {
    format!("sqlite://{}?mode=rwc", path.display())
}

fn ensure_layout(data_dir: &Path) -> AppResult<()> {
    let assets = data_dir.join(UPLOADS_DIR_NAME).join(SYSTEM_ASSETS_DIR_NAME);
    if !assets.exists() {
        tracing::info!(path = %assets.display(), "Creating data directories");
    }
    fs::create_dir_all(&assets).map_err(|e| {
        AppError::internal(format!("Failed to create {}: {}", assets.display(), e))
    })
}

fn write_env_file(path: &Path) -> AppResult<()> {
    let contents = format!(
        "# Auto-generated config\n\
         \n# HTTP port\nPORT={}\n\
         \n# JWT signing secret (generated)\nJWT_SECRET={}\n\
         \n# Session lifetime in hours\nJWT_EXPIRATION_HOURS={}\n",
        DEFAULT_SERVER_PORT,
        generate_secret(),
        DEFAULT_JWT_EXPIRATION_HOURS,
    );

    fs::write(path, contents)
        .map_err(|e| AppError::internal(format!("Failed to write {}: {}", path.display(), e)))
}

/// Hex-encoded random secret from the OS RNG.
fn generate_secret() -> String {
    let mut bytes = [0u8; GENERATED_SECRET_BYTES];
    OsRng.fill_bytes(&mut bytes);
    bytes.iter().fold(String::with_capacity(bytes.len() * 2), |mut out, b| {
        let _ = write!(out, "{:02x}", b);
        out
    })
}
