//! The batch driver.

use crate::engine::validate_row;
use crate::error::{RowError, StoreError};
use crate::outcome::{Failure, ImportOutcome};
use crate::row::RawRow;
use crate::rules::RuleTable;
use crate::store::ImportStore;
use async_trait::async_trait;
use chrono::NaiveDate;
use inkwell_common_log::spans::{import_span, Timer};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info, warn, Instrument};

/// Entity an import produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImportKind {
    Users,
    Posts,
}

impl ImportKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Users => "users",
            Self::Posts => "posts",
        }
    }
}

impl fmt::Display for ImportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-entity behaviour plugged into [`run_import`].
#[async_trait]
pub trait RowImporter: Send + Sync {
    /// Record produced from a valid row.
    type Record: Send;

    fn kind(&self) -> ImportKind;

    fn rules(&self) -> &RuleTable;

    /// Build the record for a row that passed validation.
    fn transform(&self, row: &RawRow, today: NaiveDate) -> Result<Self::Record, RowError>;

    /// Write one record. Must be atomic.
    async fn persist(&self, store: &dyn ImportStore, record: Self::Record) -> Result<(), StoreError>;
}

/// Validate, transform and persist every row in order.
///
/// Row numbers are 1-based. A row either ends up imported or counts once
/// toward `skipped`; nothing a single row does aborts the batch.
pub async fn run_import<I>(
    importer: &I,
    store: &dyn ImportStore,
    rows: Vec<RawRow>,
    today: NaiveDate,
) -> ImportOutcome
where
    I: RowImporter + ?Sized,
{
    let span = import_span(importer.kind().as_str(), rows.len());
    async move {
        let timer = Timer::start("import");
        let mut outcome = ImportOutcome::default();

        for (index, row) in rows.into_iter().enumerate() {
            let row_number = index + 1;

            match validate_row(importer.rules(), &row, store, today).await {
                Ok(failures) if failures.is_empty() => {}
                Ok(failures) => {
                    debug!(row = row_number, fields = failures.len(), "Row failed validation");
                    outcome.record_failures(failures.into_iter().map(|failure| Failure {
                        row: row_number,
                        field: failure.field.to_string(),
                        messages: failure.messages,
                        values: row.values().clone(),
                    }));
                    continue;
                }
                Err(e) => {
                    warn!(row = row_number, error = %e, "Lookup failed during validation");
                    outcome.record_error(row_number, e);
                    continue;
                }
            }

            let result = match importer.transform(&row, today) {
                Ok(record) => importer.persist(store, record).await.map_err(RowError::from),
                Err(e) => Err(e),
            };
            match result {
                Ok(()) => outcome.record_imported(),
                Err(e) => {
                    warn!(row = row_number, error = %e, "Row could not be imported");
                    outcome.record_error(row_number, e);
                }
            }
        }

        info!(
            imported = outcome.imported,
            skipped = outcome.skipped,
            total_errors = outcome.total_errors(),
            duration_ms = timer.finish(),
            "Import finished"
        );
        outcome
    }
    .instrument(span)
    .await
}
