use super::{renderer_for, ExportError, ExportResult, Report};
use crate::db::repo::{exports, posts, users};
use crate::storage::BlobStorage;
use chrono::{DateTime, Utc};
use inkwell_common_log::spans::{export_span, Timer};
use inkwell_domain::{ExportFormat, ExportId, ExportKind, ExportRecord, UserId};
use serde::Serialize;
use sqlx::PgPool;
use std::sync::Arc;
use tracing::{info, warn, Instrument};
use uuid::Uuid;

/// What the caller gets back after an export.
#[derive(Debug, Clone, Serialize)]
pub struct ExportSummary {
    pub export_id: ExportId,
    pub file_name: String,
    pub record_count: i64,
    pub url: String,
    pub created_at: DateTime<Utc>,
}

/// Snapshots a table, renders it and records the stored file.
#[derive(Clone)]
pub struct ExportJob {
    pool: PgPool,
    storage: Arc<dyn BlobStorage>,
}

/// `<kind>_<YYYYmmddHHMMSS>_<suffix>.<ext>`, where the suffix is eight random
/// hex digits so exports started in the same second never share a file.
pub fn file_name(kind: ExportKind, format: ExportFormat, at: DateTime<Utc>) -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!(
        "{}_{}_{}.{}",
        kind.as_str(),
        at.format("%Y%m%d%H%M%S"),
        &suffix[..8],
        format.extension()
    )
}

/// Storage key of an export file.
pub fn file_path(format: ExportFormat, file_name: &str) -> String {
    format!("exports/{}/{}", format.as_str(), file_name)
}

impl ExportJob {
    pub fn new(pool: PgPool, storage: Arc<dyn BlobStorage>) -> Self {
        Self { pool, storage }
    }

    async fn snapshot(&self, kind: ExportKind, at: DateTime<Utc>) -> ExportResult<Report> {
        Ok(match kind {
            ExportKind::Users => Report::users(&users::list_with_roles(&self.pool).await?, at),
            ExportKind::Posts => {
                Report::posts(&posts::views(&self.pool, posts::ViewFilter::All).await?, at)
            }
        })
    }

    pub async fn run(
        &self,
        kind: ExportKind,
        format: ExportFormat,
        requested_by: UserId,
    ) -> ExportResult<ExportSummary> {
        async {
            let timer = Timer::start("export");
            let now = Utc::now();
            let report = self.snapshot(kind, now).await?;
            let record_count = report.record_count() as i64;

            let bytes = tokio::task::spawn_blocking(move || renderer_for(format).render(&report))
                .await
                .map_err(|e| ExportError::Render(e.to_string()))??;

            let file_name = file_name(kind, format, now);
            let file_path = file_path(format, &file_name);
            self.storage.put(&file_path, &bytes).await?;

            let record = exports::insert(
                &self.pool,
                &exports::NewExport {
                    kind,
                    format,
                    file_path: file_path.clone(),
                    file_name,
                    record_count,
                    user_id: requested_by,
                },
            )
            .await;
            let record = match record {
                Ok(record) => record,
                Err(e) => {
                    // Keep storage in step with the table.
                    if let Err(cleanup) = self.storage.delete(&file_path).await {
                        warn!(error = %cleanup, "Failed to remove orphaned export file");
                    }
                    return Err(ExportError::from(e));
                }
            };

            info!(
                export_id = %record.id,
                records = record_count,
                bytes = bytes.len(),
                duration_ms = timer.finish(),
                "Export stored"
            );
            Ok::<_, ExportError>(self.summary(record))
        }
        .instrument(export_span(kind.as_str(), format.as_str()))
        .await
    }

    pub fn summary(&self, record: ExportRecord) -> ExportSummary {
        ExportSummary {
            export_id: record.id,
            url: self.storage.url(&record.file_path),
            file_name: record.file_name,
            record_count: record.record_count,
            created_at: record.created_at,
        }
    }

    /// Remove an export record and its file. Returns `false` when no record
    /// has `id`.
    pub async fn delete(&self, id: ExportId) -> ExportResult<bool> {
        let Some(record) = exports::find_by_id(&self.pool, id).await? else {
            return Ok(false);
        };

        if !self.storage.delete(&record.file_path).await? {
            warn!(export_id = %id, path = %record.file_path, "Export file already gone");
        }
        let deleted = exports::delete(&self.pool, id).await?;
        info!(export_id = %id, "Export deleted");
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_file_name_and_path() {
        let at = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        let name = file_name(ExportKind::Users, ExportFormat::Pdf, at);
        assert!(name.starts_with("users_20240102030405_"));
        assert!(name.ends_with(".pdf"));
        assert_eq!(file_path(ExportFormat::Pdf, &name), format!("exports/pdf/{name}"));

        let name = file_name(ExportKind::Posts, ExportFormat::Excel, at);
        assert!(name.starts_with("posts_20240102030405_"));
        assert!(name.ends_with(".xlsx"));
        assert_eq!(
            file_path(ExportFormat::Excel, &name),
            format!("exports/excel/{name}")
        );
    }

    #[test]
    fn test_file_name_suffix_is_eight_hex_digits() {
        let at = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        let name = file_name(ExportKind::Users, ExportFormat::Excel, at);
        let suffix = name
            .strip_prefix("users_20240102030405_")
            .and_then(|rest| rest.strip_suffix(".xlsx"))
            .unwrap();
        assert_eq!(suffix.len(), 8);
        assert!(suffix.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_same_second_exports_get_distinct_files() {
        let at = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        let names: std::collections::HashSet<String> = (0..64)
            .map(|_| file_name(ExportKind::Posts, ExportFormat::Pdf, at))
            .collect();
        assert_eq!(names.len(), 64);
    }
}
