//! Bulk export of users and posts to PDF or Excel files.

mod job;
mod pdf;
mod report;
mod xlsx;

pub use job::{ExportJob, ExportSummary};
pub use pdf::PdfRenderer;
pub use report::Report;
pub use xlsx::XlsxRenderer;

use crate::storage::StorageError;
use inkwell_domain::ExportFormat;
use thiserror::Error;

/// Export error.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("render error: {0}")]
    Render(String),
}

/// Export result.
pub type ExportResult<T> = Result<T, ExportError>;

/// Turns a report into file bytes.
pub trait ExportRenderer: Send + Sync {
    fn render(&self, report: &Report) -> ExportResult<Vec<u8>>;
}

/// Renderer for `format`.
pub fn renderer_for(format: ExportFormat) -> Box<dyn ExportRenderer> {
    match format {
        ExportFormat::Pdf => Box::new(PdfRenderer::default()),
        ExportFormat::Excel => Box::new(XlsxRenderer),
    }
}
