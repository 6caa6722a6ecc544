//! Batch outcome and the report sent back to the uploader.

use serde::Serialize;
use std::collections::BTreeMap;

/// One field of one row that failed validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Failure {
    /// 1-based data row number.
    pub row: usize,
    pub field: String,
    #[serde(rename = "errors")]
    pub messages: Vec<String>,
    /// The row's raw values, echoed back for correction.
    #[serde(rename = "data")]
    pub values: BTreeMap<String, String>,
}

/// Aggregate result of one batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportOutcome {
    pub imported: usize,
    pub skipped: usize,
    pub failures: Vec<Failure>,
    pub errors: Vec<String>,
}

/// Overall verdict of a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ImportStatus {
    /// Nothing went wrong.
    Completed,
    /// Some rows were imported, some were not.
    Partial,
    /// Nothing was imported and at least one row was rejected.
    Failed,
}

impl ImportStatus {
    pub fn message(&self) -> &'static str {
        match self {
            Self::Completed => "Import completed",
            Self::Partial => "Import completed with some errors",
            Self::Failed => "Import failed. All rows have errors.",
        }
    }
}

impl ImportOutcome {
    pub fn total_errors(&self) -> usize {
        self.failures.len() + self.errors.len()
    }

    pub fn status(&self) -> ImportStatus {
        if self.total_errors() == 0 {
            ImportStatus::Completed
        } else if self.imported > 0 {
            ImportStatus::Partial
        } else {
            ImportStatus::Failed
        }
    }

    pub(crate) fn record_imported(&mut self) {
        self.imported += 1;
    }

    pub(crate) fn record_failures(&mut self, failures: impl IntoIterator<Item = Failure>) {
        self.failures.extend(failures);
        self.skipped += 1;
    }

    pub(crate) fn record_error(&mut self, row: usize, message: impl std::fmt::Display) {
        self.errors.push(format!("Row {row}: {message}"));
        self.skipped += 1;
    }

    pub fn into_report(self) -> ImportReport {
        let status = self.status();
        ImportReport {
            success: status != ImportStatus::Failed,
            message: status.message().to_string(),
            data: ImportReportData {
                imported_count: self.imported,
                skipped_count: self.skipped,
                total_errors: self.total_errors(),
                validation_errors: self.failures,
                errors: self.errors,
            },
        }
    }
}

/// JSON body returned by the import endpoints.
#[derive(Debug, Clone, Serialize)]
pub struct ImportReport {
    pub success: bool,
    pub message: String,
    pub data: ImportReportData,
}

#[derive(Debug, Clone, Serialize)]
pub struct ImportReportData {
    pub imported_count: usize,
    pub skipped_count: usize,
    pub total_errors: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub validation_errors: Vec<Failure>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn failure(row: usize) -> Failure {
        Failure {
            row,
            field: "email".into(),
            messages: vec!["The email field is required.".into()],
            values: BTreeMap::from([("email".to_string(), String::new())]),
        }
    }

    #[test]
    fn test_status() {
        let mut outcome = ImportOutcome::default();
        assert_eq!(outcome.status(), ImportStatus::Completed);

        outcome.record_failures([failure(1)]);
        assert_eq!(outcome.status(), ImportStatus::Failed);

        outcome.record_imported();
        assert_eq!(outcome.status(), ImportStatus::Partial);
    }

    #[test]
    fn test_empty_batch_is_completed() {
        let report = ImportOutcome::default().into_report();
        assert!(report.success);
        assert_eq!(report.message, "Import completed");
    }

    #[test]
    fn test_report_json_shape() {
        let mut outcome = ImportOutcome::default();
        outcome.record_imported();
        outcome.record_failures([failure(2)]);
        outcome.record_error(3, "duplicate value");

        let json = serde_json::to_value(outcome.into_report()).unwrap();
        assert_eq!(
            json,
            json!({
                "success": true,
                "message": "Import completed with some errors",
                "data": {
                    "imported_count": 1,
                    "skipped_count": 2,
                    "total_errors": 2,
                    "validation_errors": [{
                        "row": 2,
                        "field": "email",
                        "errors": ["The email field is required."],
                        "data": {"email": ""}
                    }],
                    "errors": ["Row 3: duplicate value"]
                }
            })
        );
    }

    #[test]
    fn test_clean_report_omits_error_lists() {
        let mut outcome = ImportOutcome::default();
        outcome.record_imported();
        let json = serde_json::to_value(outcome.into_report()).unwrap();
        assert!(json["data"].get("validation_errors").is_none());
        assert!(json["data"].get("errors").is_none());
    }
}
