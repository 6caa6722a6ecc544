//! Import error types.

use thiserror::Error;

/// The upload itself could not be read. Fatal to the whole import.
#[derive(Debug, Error)]
pub enum SourceReadError {
    #[error("unsupported file type: {0}")]
    UnsupportedFormat(String),

    #[error("the file has no heading row")]
    MissingHeadings,

    #[error("the workbook has no worksheets")]
    EmptyWorkbook,

    #[error("unable to parse CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("unable to read workbook: {0}")]
    Workbook(#[from] calamine::Error),
}

/// Failure reported by an [`ImportStore`](crate::ImportStore).
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// A unique constraint rejected the write.
    #[error("duplicate value violates unique constraint \"{0}\"")]
    UniqueViolation(String),

    /// A referenced record does not exist.
    #[error("referenced record does not exist: {0}")]
    MissingReference(String),

    #[error("storage error: {0}")]
    Backend(String),
}

impl StoreError {
    pub fn backend(err: impl std::fmt::Display) -> Self {
        Self::Backend(err.to_string())
    }
}

/// Unexpected failure while transforming or persisting one row.
#[derive(Debug, Error)]
pub enum RowError {
    #[error("{0}")]
    Store(#[from] StoreError),

    #[error("invalid value for {field}: {reason}")]
    Transform { field: &'static str, reason: String },

    #[error(transparent)]
    Password(#[from] inkwell_domain::PasswordError),
}

impl RowError {
    pub fn transform(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Transform {
            field,
            reason: reason.into(),
        }
    }
}
