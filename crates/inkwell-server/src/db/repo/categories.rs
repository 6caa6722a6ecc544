//! `categories` table.

use inkwell_domain::{Category, CategoryId};
use sqlx::PgExecutor;

pub async fn list<'e>(db: impl PgExecutor<'e>) -> sqlx::Result<Vec<Category>> {
    sqlx::query_as::<_, Category>("SELECT * FROM categories ORDER BY name")
        .fetch_all(db)
        .await
}

pub async fn find_by_id<'e>(
    db: impl PgExecutor<'e>,
    id: CategoryId,
) -> sqlx::Result<Option<Category>> {
    sqlx::query_as::<_, Category>("SELECT * FROM categories WHERE id = $1")
        .bind(id)
        .fetch_optional(db)
        .await
}

pub async fn insert<'e>(db: impl PgExecutor<'e>, name: &str) -> sqlx::Result<Category> {
    sqlx::query_as::<_, Category>("INSERT INTO categories (name) VALUES ($1) RETURNING *")
        .bind(name)
        .fetch_one(db)
        .await
}

pub async fn rename<'e>(
    db: impl PgExecutor<'e>,
    id: CategoryId,
    name: &str,
) -> sqlx::Result<Option<Category>> {
    sqlx::query_as::<_, Category>(
        "UPDATE categories SET name = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .bind(name)
    .fetch_optional(db)
    .await
}

pub async fn delete<'e>(db: impl PgExecutor<'e>, id: CategoryId) -> sqlx::Result<bool> {
    let result = sqlx::query("DELETE FROM categories WHERE id = $1")
        .bind(id)
        .execute(db)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// The ids in `ids` that name no category, in input order.
pub async fn missing<'e>(db: impl PgExecutor<'e>, ids: &[i64]) -> sqlx::Result<Vec<i64>> {
    let found: Vec<i64> = sqlx::query_scalar("SELECT id FROM categories WHERE id = ANY($1)")
        .bind(ids)
        .fetch_all(db)
        .await?;
    Ok(ids.iter().copied().filter(|id| !found.contains(id)).collect())
}
