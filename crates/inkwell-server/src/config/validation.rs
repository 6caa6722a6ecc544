//! Configuration validation.

use super::types::ServerConfig;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid JWT secret: must be at least 32 characters")]
    InvalidJwtSecret,

    #[error("Invalid database URL")]
    InvalidDatabaseUrl,

    #[error("Invalid bind address: {0}")]
    InvalidBindAddress(String),

    #[error("Invalid port: {0}")]
    InvalidPort(u16),

    #[error("Invalid log level: {0}")]
    InvalidLogLevel(String),

    #[error("Invalid log format: {0}")]
    InvalidLogFormat(String),

    #[error("Token expiry must be positive")]
    InvalidTokenExpiry,

    #[error("Default import password must be at least 6 characters")]
    WeakImportPassword,

    #[error("Seed admin email given without a password")]
    MissingSeedPassword,
}

/// Validate server configuration, collecting every problem.
pub fn validate_config(config: &ServerConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if config.auth.jwt_secret.len() < 32 {
        errors.push(ConfigError::InvalidJwtSecret);
    }

    if !config.database.url.starts_with("postgres://")
        && !config.database.url.starts_with("postgresql://")
    {
        errors.push(ConfigError::InvalidDatabaseUrl);
    }

    if config.server.port == 0 {
        errors.push(ConfigError::InvalidPort(0));
    } else if config.server.socket_addr().is_err() {
        errors.push(ConfigError::InvalidBindAddress(config.server.host.clone()));
    }

    let valid_levels = ["trace", "debug", "info", "warn", "error"];
    if !valid_levels.contains(&config.logging.level.to_lowercase().as_str()) {
        errors.push(ConfigError::InvalidLogLevel(config.logging.level.clone()));
    }

    let valid_formats = ["pretty", "json", "compact"];
    if !valid_formats.contains(&config.logging.format.to_lowercase().as_str()) {
        errors.push(ConfigError::InvalidLogFormat(config.logging.format.clone()));
    }

    if config.auth.access_token_expiry_secs <= 0 {
        errors.push(ConfigError::InvalidTokenExpiry);
    }

    if config.import.default_password.chars().count() < 6 {
        errors.push(ConfigError::WeakImportPassword);
    }

    if config.seed.admin_email.is_some() && config.seed.admin_password.is_none() {
        errors.push(ConfigError::MissingSeedPassword);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
pub(crate) fn test_config() -> ServerConfig {
    use super::types::*;

    ServerConfig {
        server: ServerBindConfig {
            host: "127.0.0.1".to_string(),
            port: 8080,
            request_timeout_secs: 30,
            body_limit_bytes: 10 * 1024 * 1024,
        },
        database: DatabaseConfig {
            url: "postgres://localhost/inkwell_test".to_string(),
            max_connections: 2,
            min_connections: 0,
            connect_timeout_secs: 1,
            idle_timeout_secs: 60,
            run_migrations: false,
        },
        auth: AuthConfig {
            jwt_secret: "a".repeat(32),
            access_token_expiry_secs: 3600,
        },
        logging: LoggingConfig {
            level: "info".to_string(),
            format: "pretty".to_string(),
            log_requests: true,
            exclude_paths: vec!["/internal/health".to_string()],
        },
        cors: CorsConfig::default(),
        storage: StorageConfig {
            root: std::path::PathBuf::from("storage"),
            public_url: "/storage".to_string(),
        },
        import: ImportConfig::default(),
        seed: SeedConfig::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn has(result: Result<(), Vec<ConfigError>>, pred: impl Fn(&ConfigError) -> bool) -> bool {
        result.unwrap_err().iter().any(pred)
    }

    #[test]
    fn test_valid_config() {
        assert!(validate_config(&test_config()).is_ok());
    }

    #[test]
    fn test_invalid_jwt_secret() {
        let mut config = test_config();
        config.auth.jwt_secret = "short".to_string();
        assert!(has(validate_config(&config), |e| matches!(e, ConfigError::InvalidJwtSecret)));
    }

    #[test]
    fn test_invalid_database_url() {
        let mut config = test_config();
        config.database.url = "mysql://localhost/x".to_string();
        assert!(has(validate_config(&config), |e| matches!(e, ConfigError::InvalidDatabaseUrl)));
    }

    #[test]
    fn test_invalid_bind_address() {
        let mut config = test_config();
        config.server.host = "not a host".to_string();
        assert!(has(validate_config(&config), |e| matches!(e, ConfigError::InvalidBindAddress(_))));
    }

    #[test]
    fn test_invalid_port() {
        let mut config = test_config();
        config.server.port = 0;
        assert!(has(validate_config(&config), |e| matches!(e, ConfigError::InvalidPort(0))));
    }

    #[test]
    fn test_invalid_log_settings() {
        let mut config = test_config();
        config.logging.level = "loud".to_string();
        config.logging.format = "xml".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn test_seed_requires_password() {
        let mut config = test_config();
        config.seed.admin_email = Some("admin@example.com".into());
        assert!(has(validate_config(&config), |e| matches!(e, ConfigError::MissingSeedPassword)));
    }

    #[test]
    fn test_collects_every_error() {
        let mut config = test_config();
        config.auth.jwt_secret.clear();
        config.auth.access_token_expiry_secs = 0;
        config.import.default_password = "123".into();
        assert_eq!(validate_config(&config).unwrap_err().len(), 3);
    }
}
