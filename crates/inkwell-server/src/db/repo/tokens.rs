//! `revoked_tokens` table.

use chrono::{DateTime, Utc};
use inkwell_domain::UserId;
use sqlx::PgExecutor;

/// Record `jti` as revoked until it would have expired anyway.
pub async fn revoke<'e>(
    db: impl PgExecutor<'e>,
    jti: &str,
    user_id: UserId,
    expires_at: DateTime<Utc>,
) -> sqlx::Result<()> {
    sqlx::query(
        "INSERT INTO revoked_tokens (jti, user_id, expires_at)
         VALUES ($1, $2, $3)
         ON CONFLICT (jti) DO NOTHING",
    )
    .bind(jti)
    .bind(user_id)
    .bind(expires_at)
    .execute(db)
    .await?;
    Ok(())
}

pub async fn is_revoked<'e>(db: impl PgExecutor<'e>, jti: &str) -> sqlx::Result<bool> {
    sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM revoked_tokens WHERE jti = $1)")
        .bind(jti)
        .fetch_one(db)
        .await
}

/// Drop revocations whose tokens have expired. Returns the number removed.
pub async fn purge_expired<'e>(db: impl PgExecutor<'e>) -> sqlx::Result<u64> {
    let result = sqlx::query("DELETE FROM revoked_tokens WHERE expires_at < NOW()")
        .execute(db)
        .await?;
    Ok(result.rows_affected())
}
