//! Database pool management.

use crate::config::DatabaseConfig;
use anyhow::{Context, Result};
use sqlx::{
    postgres::{PgConnectOptions, PgPoolOptions},
    PgPool,
};
use std::str::FromStr;
use tracing::info;

fn pool_options(config: &DatabaseConfig) -> PgPoolOptions {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(config.connect_timeout())
        .idle_timeout(Some(config.idle_timeout()))
}

/// Create a database connection pool and check it can reach the server.
pub async fn create_pool(config: &DatabaseConfig) -> Result<PgPool> {
    info!("Creating database connection pool...");

    let connect_options =
        PgConnectOptions::from_str(&config.url).context("Invalid database URL")?;

    let pool = pool_options(config)
        .connect_with(connect_options)
        .await
        .context("Failed to create database pool")?;

    verify_connection(&pool).await?;

    info!(
        max_connections = config.max_connections,
        min_connections = config.min_connections,
        "Database pool created"
    );

    Ok(pool)
}

/// Pool that opens connections on first use. Nothing is contacted here.
pub fn lazy_pool(config: &DatabaseConfig) -> Result<PgPool> {
    pool_options(config)
        .connect_lazy(&config.url)
        .context("Invalid database URL")
}

/// Verify database connection.
pub async fn verify_connection(pool: &PgPool) -> Result<()> {
    sqlx::query("SELECT 1")
        .execute(pool)
        .await
        .context("Database connection verification failed")?;

    info!("Database connection verified");
    Ok(())
}

/// Get pool statistics.
pub fn pool_stats(pool: &PgPool) -> PoolStats {
    let idle = pool.num_idle();
    PoolStats {
        size: pool.size(),
        idle,
        active: pool.size().saturating_sub(idle as u32),
    }
}

/// Pool statistics.
#[derive(Debug, Clone, serde::Serialize)]
pub struct PoolStats {
    pub size: u32,
    pub idle: usize,
    pub active: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_lazy_pool_starts_empty() {
        let config = crate::config::test_config().database;
        let pool = lazy_pool(&config).unwrap();
        let stats = pool_stats(&pool);
        assert_eq!(stats.size, 0);
        assert_eq!(stats.active, 0);
    }

    #[test]
    fn test_lazy_pool_rejects_bad_url() {
        let mut config = crate::config::test_config().database;
        config.url = "not a url".into();
        assert!(lazy_pool(&config).is_err());
    }
}
