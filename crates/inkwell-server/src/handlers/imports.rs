//! Spreadsheet imports and their CSV templates.

use super::upload::read_file;
use crate::db::PgImportStore;
use crate::error::{ApiResult, ErrorContext};
use crate::middleware::{guard, guard_adult, CurrentActor};
use crate::state::AppState;
use axum::{
    extract::{Multipart, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use inkwell_import::{
    read_rows, run_import, ImportKind, ImportOutcome, ImportStatus, PostsImporter, RowImporter,
    SourceFormat, UsersImporter,
};
use inkwell_policy::{Action, ResourceKind};
use tracing::info;

const USERS_TEMPLATE: &[&[&str]] = &[
    &["name", "email", "mobile_number", "address", "date_of_birth", "password"],
    &["John Doe", "john@example.com", "0771234567", "123 Main St, Colombo", "1990-01-15", "password123"],
    &["Jane Smith", "jane@example.com", "0779876543", "456 Park Ave, Kandy", "1985-05-20", "password456"],
];

const POSTS_TEMPLATE: &[&[&str]] = &[
    &["title", "body", "user_id", "image"],
    &["Sample Post Title 1", "This is the body content of the first post", "1", ""],
    &["Sample Post Title 2", "This is the body content of the second post", "1", "posts/sample.jpg"],
];

/// HTTP status for a finished batch: 422 only when every row failed.
pub fn status_for(status: ImportStatus) -> StatusCode {
    match status {
        ImportStatus::Completed | ImportStatus::Partial => StatusCode::OK,
        ImportStatus::Failed => StatusCode::UNPROCESSABLE_ENTITY,
    }
}

fn report(outcome: ImportOutcome) -> Response {
    let status = status_for(outcome.status());
    (status, Json(outcome.into_report())).into_response()
}

async fn import_with<I: RowImporter>(
    state: &AppState,
    importer: &I,
    multipart: Multipart,
) -> ApiResult<ImportOutcome> {
    let upload = read_file(multipart, "file", state.config.import.max_upload_bytes).await?;
    let format = SourceFormat::from_file_name(&upload.file_name)?;
    let rows = read_rows(&upload.bytes, format)?;

    let store = PgImportStore::new(state.db.clone());
    let outcome = run_import(importer, &store, rows, Utc::now().date_naive()).await;
    info!(
        kind = importer.kind().as_str(),
        file = %upload.file_name,
        format = ?format,
        status = ?outcome.status(),
        "Import upload processed"
    );
    Ok(outcome)
}

pub async fn users(
    State(state): State<AppState>,
    current: CurrentActor,
    multipart: Multipart,
) -> ApiResult<Response> {
    guard(&current.actor, Action::Import, ResourceKind::Users)?;
    let importer = UsersImporter::new(state.config.import.default_password.clone());
    Ok(report(import_with(&state, &importer, multipart).await?))
}

/// Importing posts creates content, so the importer must pass the age gate.
pub async fn posts(
    State(state): State<AppState>,
    current: CurrentActor,
    multipart: Multipart,
) -> ApiResult<Response> {
    guard_adult(
        &current.actor,
        Action::Import,
        ResourceKind::Posts,
        Utc::now().date_naive(),
    )?;
    Ok(report(import_with(&state, &PostsImporter::new(), multipart).await?))
}

fn csv_template(rows: &[&[&str]]) -> ApiResult<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for row in rows {
        writer.write_record(*row).context("Failed to write template row")?;
    }
    writer.into_inner().context("Failed to finish template")
}

fn csv_download(file_name: &str, rows: &[&[&str]]) -> ApiResult<Response> {
    let body = csv_template(rows)?;
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{file_name}\""),
            ),
        ],
        body,
    )
        .into_response())
}

pub async fn users_template() -> ApiResult<Response> {
    csv_download(
        &format!("{}_import_template.csv", ImportKind::Users.as_str()),
        USERS_TEMPLATE,
    )
}

pub async fn posts_template() -> ApiResult<Response> {
    csv_download(
        &format!("{}_import_template.csv", ImportKind::Posts.as_str()),
        POSTS_TEMPLATE,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(status_for(ImportStatus::Completed), StatusCode::OK);
        assert_eq!(status_for(ImportStatus::Partial), StatusCode::OK);
        assert_eq!(status_for(ImportStatus::Failed), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn test_templates_read_back_as_rows() {
        let bytes = csv_template(USERS_TEMPLATE).unwrap();
        let rows = read_rows(&bytes, SourceFormat::Csv).unwrap();
        assert_eq!(rows.len(), 2);

        let bytes = csv_template(POSTS_TEMPLATE).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.starts_with("title,body,user_id,image\n"));
    }

    #[test]
    fn test_users_template_quotes_commas() {
        let text = String::from_utf8(csv_template(USERS_TEMPLATE).unwrap()).unwrap();
        assert!(text.contains("\"123 Main St, Colombo\""));
    }
}
