//! `roles`, `role_permissions` and `user_roles` tables.

use anyhow::Context;
use inkwell_domain::UserId;
use inkwell_policy::RoleRegistry;
use sqlx::{PgExecutor, PgPool};
use tracing::info;

/// Build the role registry from the stored grants.
pub async fn load_registry(pool: &PgPool) -> anyhow::Result<RoleRegistry> {
    let names: Vec<String> = sqlx::query_scalar("SELECT name FROM roles ORDER BY name")
        .fetch_all(pool)
        .await
        .context("Failed to load roles")?;

    let grants: Vec<(String, String)> = sqlx::query_as(
        "SELECT r.name, p.name
         FROM role_permissions rp
         JOIN roles r ON r.id = rp.role_id
         JOIN permissions p ON p.id = rp.permission_id",
    )
    .fetch_all(pool)
    .await
    .context("Failed to load role permissions")?;

    let grant_count = grants.len();
    let registry = RoleRegistry::from_grants(names, grants)
        .context("Stored permission name is not recognised")?;

    info!(
        roles = ?registry.role_names(),
        grants = grant_count,
        "Role registry loaded"
    );
    Ok(registry)
}

/// Role names held by `user_id`, sorted.
pub async fn roles_of<'e>(db: impl PgExecutor<'e>, user_id: UserId) -> sqlx::Result<Vec<String>> {
    sqlx::query_scalar(
        "SELECT r.name
         FROM user_roles ur
         JOIN roles r ON r.id = ur.role_id
         WHERE ur.user_id = $1
         ORDER BY r.name",
    )
    .bind(user_id)
    .fetch_all(db)
    .await
}

pub async fn exists<'e>(db: impl PgExecutor<'e>, name: &str) -> sqlx::Result<bool> {
    sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM roles WHERE name = $1)")
        .bind(name)
        .fetch_one(db)
        .await
}

/// Give `user_id` the role `name`. Unknown role names assign nothing.
pub async fn assign<'e>(db: impl PgExecutor<'e>, user_id: UserId, name: &str) -> sqlx::Result<()> {
    sqlx::query(
        "INSERT INTO user_roles (user_id, role_id)
         SELECT $1, id FROM roles WHERE name = $2
         ON CONFLICT DO NOTHING",
    )
    .bind(user_id)
    .bind(name)
    .execute(db)
    .await?;
    Ok(())
}

pub async fn remove<'e>(db: impl PgExecutor<'e>, user_id: UserId, name: &str) -> sqlx::Result<()> {
    sqlx::query(
        "DELETE FROM user_roles
         WHERE user_id = $1 AND role_id = (SELECT id FROM roles WHERE name = $2)",
    )
    .bind(user_id)
    .bind(name)
    .execute(db)
    .await?;
    Ok(())
}

/// Replace every role of `user_id` with `name`.
pub async fn sync(pool: &PgPool, user_id: UserId, name: &str) -> sqlx::Result<()> {
    let mut tx = pool.begin().await?;
    sqlx::query("DELETE FROM user_roles WHERE user_id = $1")
        .bind(user_id)
        .execute(&mut *tx)
        .await?;
    assign(&mut *tx, user_id, name).await?;
    tx.commit().await
}
