//! Test utilities for Inkwell crates.

use chrono::NaiveDate;
use std::path::PathBuf;
use tempfile::TempDir;

/// Creates a temporary directory that is cleaned up on drop.
pub fn temp_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

/// Creates a temporary file named `name` with given content.
pub fn temp_file(name: &str, content: &[u8]) -> (TempDir, PathBuf) {
    let dir = temp_dir();
    let path = dir.path().join(name);
    std::fs::write(&path, content).expect("Failed to write temp file");
    (dir, path)
}

/// Shorthand for a calendar date.
pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid calendar date")
}

/// Builds an upload body in CSV form.
///
/// ```
/// use inkwell_test_utils::CsvFixture;
///
/// let bytes = CsvFixture::new(["Name", "Email"])
///     .row(["Ada", "ada@example.com"])
///     .to_bytes();
/// assert!(String::from_utf8(bytes).unwrap().starts_with("Name,Email\n"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct CsvFixture {
    headings: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl CsvFixture {
    pub fn new<I, S>(headings: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            headings: headings.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    pub fn row<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.rows.push(values.into_iter().map(Into::into).collect());
        self
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer
            .write_record(&self.headings)
            .expect("write heading row");
        for row in &self.rows {
            writer.write_record(row).expect("write data row");
        }
        writer.into_inner().expect("flush csv buffer")
    }
}

/// Assert that a Result is Ok and return the value.
#[macro_export]
macro_rules! assert_ok {
    ($expr:expr) => {
        match $expr {
            Ok(v) => v,
            Err(e) => panic!("Expected Ok, got Err: {:?}", e),
        }
    };
}

/// Assert that a Result is Err and return the error.
#[macro_export]
macro_rules! assert_err {
    ($expr:expr) => {
        match $expr {
            Ok(v) => panic!("Expected Err, got Ok: {:?}", v),
            Err(e) => e,
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_temp_file_creation() {
        let (_dir, path) = temp_file("users.csv", b"name\nAda\n");
        assert!(path.is_file());
        assert_eq!(std::fs::read(&path).unwrap(), b"name\nAda\n");
    }

    #[test]
    fn test_csv_fixture_quotes_commas() {
        let bytes = CsvFixture::new(["address"]).row(["1 Loop Rd, Colombo"]).to_bytes();
        assert_eq!(
            String::from_utf8(bytes).unwrap(),
            "address\n\"1 Loop Rd, Colombo\"\n"
        );
    }

    #[test]
    fn test_assert_macros() {
        let ok: Result<u8, String> = Ok(3);
        assert_eq!(assert_ok!(ok), 3);
        let err: Result<u8, String> = Err("boom".into());
        assert_eq!(assert_err!(err), "boom");
    }

    proptest! {
        #[test]
        fn test_csv_fixture_row_count(rows in prop::collection::vec("[a-z]{1,8}", 0..10)) {
            let mut fixture = CsvFixture::new(["name"]);
            for row in &rows {
                fixture = fixture.row([row.as_str()]);
            }
            let text = String::from_utf8(fixture.to_bytes()).unwrap();
            prop_assert_eq!(text.lines().count(), rows.len() + 1);
        }
    }
}
