//! `exports` table.

use inkwell_domain::{ExportFormat, ExportId, ExportKind, ExportRecord, UserId};
use sqlx::PgExecutor;

/// Fields of a new export record.
#[derive(Debug, Clone)]
pub struct NewExport {
    pub kind: ExportKind,
    pub format: ExportFormat,
    pub file_path: String,
    pub file_name: String,
    pub record_count: i64,
    pub user_id: UserId,
}

pub async fn insert<'e>(db: impl PgExecutor<'e>, export: &NewExport) -> sqlx::Result<ExportRecord> {
    sqlx::query_as::<_, ExportRecord>(
        "INSERT INTO exports (type, format, file_path, file_name, record_count, user_id)
         VALUES ($1, $2, $3, $4, $5, $6)
         RETURNING *",
    )
    .bind(export.kind.as_str())
    .bind(export.format.as_str())
    .bind(&export.file_path)
    .bind(&export.file_name)
    .bind(export.record_count)
    .bind(export.user_id)
    .fetch_one(db)
    .await
}

pub async fn find_by_id<'e>(
    db: impl PgExecutor<'e>,
    id: ExportId,
) -> sqlx::Result<Option<ExportRecord>> {
    sqlx::query_as::<_, ExportRecord>("SELECT * FROM exports WHERE id = $1")
        .bind(id)
        .fetch_optional(db)
        .await
}

pub async fn delete<'e>(db: impl PgExecutor<'e>, id: ExportId) -> sqlx::Result<bool> {
    let result = sqlx::query("DELETE FROM exports WHERE id = $1")
        .bind(id)
        .execute(db)
        .await?;
    Ok(result.rows_affected() > 0)
}
