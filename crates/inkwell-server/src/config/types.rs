//! Server configuration types.

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Main server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server binding configuration.
    pub server: ServerBindConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Authentication configuration.
    pub auth: AuthConfig,
    /// Logging configuration.
    pub logging: LoggingConfig,
    /// CORS configuration.
    pub cors: CorsConfig,
    /// Uploaded and exported file storage.
    pub storage: StorageConfig,
    /// Row import settings.
    #[serde(default)]
    pub import: ImportConfig,
    /// Bootstrap administrator account.
    #[serde(default)]
    pub seed: SeedConfig,
}

/// Server binding configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerBindConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to bind to.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Request timeout.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    /// Largest accepted request body.
    #[serde(default = "default_body_limit")]
    pub body_limit_bytes: usize,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_request_timeout() -> u64 {
    30
}

fn default_body_limit() -> usize {
    10 * 1024 * 1024
}

impl ServerBindConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Database configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Database URL.
    pub url: String,
    /// Maximum connections in pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum connections in pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    /// Connection acquire timeout.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    /// Idle timeout.
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: u64,
    /// Apply embedded migrations at startup.
    #[serde(default = "default_true")]
    pub run_migrations: bool,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_idle_timeout() -> u64 {
    600
}

fn default_true() -> bool {
    true
}

impl DatabaseConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_secs)
    }
}

/// Authentication configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// JWT secret key.
    pub jwt_secret: String,
    /// Access token expiry (seconds).
    #[serde(default = "default_access_token_expiry")]
    pub access_token_expiry_secs: i64,
}

fn default_access_token_expiry() -> i64 {
    86400 // 1 day
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level.
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (pretty, compact or json).
    #[serde(default = "default_log_format")]
    pub format: String,
    /// Enable request logging.
    #[serde(default = "default_true")]
    pub log_requests: bool,
    /// Paths to exclude from logging.
    #[serde(default)]
    pub exclude_paths: Vec<String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

/// CORS configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CorsConfig {
    /// Allowed origins.
    #[serde(default)]
    pub allowed_origins: Vec<String>,
    /// Allow any origin.
    #[serde(default)]
    pub allow_any_origin: bool,
    /// Max age for preflight cache.
    #[serde(default = "default_cors_max_age")]
    pub max_age_secs: u64,
}

fn default_cors_max_age() -> u64 {
    86400
}

/// File storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory holding post images and export files.
    #[serde(default = "default_storage_root")]
    pub root: PathBuf,
    /// Public URL prefix the directory is served under.
    #[serde(default = "default_public_url")]
    pub public_url: String,
}

fn default_storage_root() -> PathBuf {
    PathBuf::from("storage")
}

fn default_public_url() -> String {
    "/storage".to_string()
}

/// Row import configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportConfig {
    /// Password given to imported users whose row leaves it blank.
    #[serde(default = "default_import_password")]
    pub default_password: String,
    /// Largest accepted upload.
    #[serde(default = "default_max_upload")]
    pub max_upload_bytes: usize,
}

fn default_import_password() -> String {
    inkwell_import::DEFAULT_IMPORT_PASSWORD.to_string()
}

fn default_max_upload() -> usize {
    10 * 1024 * 1024
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            default_password: default_import_password(),
            max_upload_bytes: default_max_upload(),
        }
    }
}

/// Administrator created at startup when no account uses its email.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SeedConfig {
    pub admin_email: Option<String>,
    pub admin_password: Option<String>,
    #[serde(default = "default_admin_name")]
    pub admin_name: String,
    /// Needed for the administrator to pass the age gate.
    pub admin_date_of_birth: Option<String>,
}

fn default_admin_name() -> String {
    "Administrator".to_string()
}
