//! Database migration utilities.

use anyhow::{Context, Result};
use sqlx::PgPool;
use tracing::info;

/// Apply the embedded migrations.
pub async fn run_migrations(pool: &PgPool) -> Result<()> {
    info!("Running database migrations...");

    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .context("Failed to run migrations")?;

    info!("Migrations completed");
    Ok(())
}

/// Names of embedded migrations not yet applied.
pub async fn pending_migrations(pool: &PgPool) -> Result<Vec<String>> {
    use sqlx::migrate::Migrate;

    let migrator = sqlx::migrate!("./migrations");
    let mut conn = pool.acquire().await?;
    conn.ensure_migrations_table()
        .await
        .context("Failed to prepare migrations table")?;
    let applied = conn
        .list_applied_migrations()
        .await
        .context("Failed to check applied migrations")?;

    Ok(migrator
        .iter()
        .filter(|m| !applied.iter().any(|a| a.version == m.version))
        .map(|m| format!("{}_{}", m.version, m.description))
        .collect())
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_migrations_are_embedded_in_order() {
        let migrator = sqlx::migrate!("./migrations");
        let versions: Vec<i64> = migrator.iter().map(|m| m.version).collect();
        assert_eq!(versions, vec![1, 2]);
    }
}
