//! Raw rows and heading normalisation.

use std::collections::BTreeMap;

/// Convert a column heading to the snake_case key used by rule tables.
///
/// `"Date of Birth"` becomes `date_of_birth`, `"User-ID"` becomes `user_id`.
pub fn normalize_heading(heading: &str) -> String {
    let mut key = String::with_capacity(heading.len());
    let mut pending_separator = false;
    for ch in heading.trim().chars() {
        if ch.is_alphanumeric() {
            if pending_separator && !key.is_empty() {
                key.push('_');
            }
            pending_separator = false;
            key.extend(ch.to_lowercase());
        } else {
            pending_separator = true;
        }
    }
    key
}

/// One data row keyed by normalised heading. Values are trimmed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRow {
    values: BTreeMap<String, String>,
}

impl RawRow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pair `headings` with `cells` by position. Columns without a heading are
    /// dropped and missing trailing cells read as blank.
    pub fn from_cells<H, C>(headings: &[H], cells: &[C]) -> Self
    where
        H: AsRef<str>,
        C: AsRef<str>,
    {
        let mut row = Self::new();
        for (index, heading) in headings.iter().enumerate() {
            let heading = heading.as_ref();
            if heading.is_empty() {
                continue;
            }
            let value = cells.get(index).map(AsRef::as_ref).unwrap_or("");
            row.insert(heading, value);
        }
        row
    }

    pub fn insert(&mut self, column: impl Into<String>, value: impl AsRef<str>) {
        self.values
            .insert(column.into(), value.as_ref().trim().to_string());
    }

    /// Builder form of [`insert`](Self::insert).
    pub fn with(mut self, column: impl Into<String>, value: impl AsRef<str>) -> Self {
        self.insert(column, value);
        self
    }

    /// The value of `column`, or `None` when it is missing or blank.
    pub fn get(&self, column: &str) -> Option<&str> {
        self.values
            .get(column)
            .map(String::as_str)
            .filter(|value| !value.is_empty())
    }

    /// Every cell is empty.
    pub fn is_blank(&self) -> bool {
        self.values.values().all(|value| value.is_empty())
    }

    pub fn values(&self) -> &BTreeMap<String, String> {
        &self.values
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_heading() {
        assert_eq!(normalize_heading("Date of Birth"), "date_of_birth");
        assert_eq!(normalize_heading("  Mobile Number "), "mobile_number");
        assert_eq!(normalize_heading("user_id"), "user_id");
        assert_eq!(normalize_heading("User-ID"), "user_id");
        assert_eq!(normalize_heading("E-mail  (work)"), "e_mail_work");
        assert_eq!(normalize_heading("   "), "");
    }

    #[test]
    fn test_from_cells_pads_and_trims() {
        let row = RawRow::from_cells(&["name", "", "email"], &[" Ada ", "ignored"]);
        assert_eq!(row.get("name"), Some("Ada"));
        assert_eq!(row.get("email"), None);
        assert_eq!(row.values().len(), 2);
    }

    #[test]
    fn test_blank_detection() {
        assert!(RawRow::new().with("a", "  ").with("b", "").is_blank());
        assert!(!RawRow::new().with("a", "x").is_blank());
    }
}
