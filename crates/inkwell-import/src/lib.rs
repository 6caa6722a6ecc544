//! Row import pipeline.
//!
//! Uploaded CSV or spreadsheet files are read into [`RawRow`]s, every row is
//! checked against a declarative [`RuleTable`], and valid rows are transformed
//! and persisted one at a time through an [`ImportStore`]. Bad rows never stop
//! the batch: they are collected into the [`ImportOutcome`].
//!
//! ```no_run
//! # async fn demo(bytes: Vec<u8>) -> Result<(), Box<dyn std::error::Error>> {
//! use inkwell_import::{read_rows, run_import, MemoryStore, SourceFormat, UsersImporter};
//!
//! let rows = read_rows(&bytes, SourceFormat::Csv)?;
//! let store = MemoryStore::new();
//! let today = chrono::Utc::now().date_naive();
//! let outcome = run_import(&UsersImporter::default(), &store, rows, today).await;
//! println!("{} imported, {} skipped", outcome.imported, outcome.skipped);
//! # Ok(())
//! # }
//! ```

pub mod engine;
pub mod error;
pub mod memory;
pub mod outcome;
pub mod pipeline;
pub mod posts;
pub mod row;
pub mod rules;
pub mod source;
pub mod store;
pub mod users;

pub use engine::{validate_row, FieldFailure};
pub use error::{RowError, SourceReadError, StoreError};
pub use memory::MemoryStore;
pub use outcome::{Failure, ImportOutcome, ImportReport, ImportReportData, ImportStatus};
pub use pipeline::{run_import, ImportKind, RowImporter};
pub use posts::PostsImporter;
pub use row::{normalize_heading, RawRow};
pub use rules::{Check, FieldRules, Presence, Rule, RuleTable};
pub use source::{read_rows, SourceFormat};
pub use store::{ImportStore, LookupKey};
pub use users::{UsersImporter, DEFAULT_IMPORT_PASSWORD};
