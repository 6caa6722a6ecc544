//! Reading uploaded files into rows.

use crate::error::SourceReadError;
use crate::row::{normalize_heading, RawRow};
use calamine::{open_workbook_auto_from_rs, Data, DataType, Reader};
use std::io::Cursor;
use std::path::Path;

/// Supported upload formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Csv,
    Xlsx,
    Xls,
}

impl SourceFormat {
    /// Pick the format from a file name's extension, case-insensitively.
    pub fn from_file_name(name: &str) -> Result<Self, SourceReadError> {
        let extension = Path::new(name)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        match extension.as_str() {
            "csv" => Ok(Self::Csv),
            "xlsx" => Ok(Self::Xlsx),
            "xls" => Ok(Self::Xls),
            _ => Err(SourceReadError::UnsupportedFormat(name.to_string())),
        }
    }
}

/// Read every non-blank data row. The first row holds the headings.
pub fn read_rows(bytes: &[u8], format: SourceFormat) -> Result<Vec<RawRow>, SourceReadError> {
    let rows = match format {
        SourceFormat::Csv => read_csv(bytes)?,
        SourceFormat::Xlsx | SourceFormat::Xls => read_workbook(bytes)?,
    };
    Ok(rows.into_iter().filter(|row| !row.is_blank()).collect())
}

fn headings<I, S>(cells: I) -> Result<Vec<String>, SourceReadError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let headings: Vec<String> = cells
        .into_iter()
        .map(|cell| normalize_heading(cell.as_ref()))
        .collect();
    if headings.iter().all(String::is_empty) {
        return Err(SourceReadError::MissingHeadings);
    }
    Ok(headings)
}

fn read_csv(bytes: &[u8]) -> Result<Vec<RawRow>, SourceReadError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(bytes);

    let headings = headings(reader.headers()?.iter())?;
    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let cells: Vec<&str> = record.iter().collect();
        rows.push(RawRow::from_cells(&headings, &cells));
    }
    Ok(rows)
}

fn read_workbook(bytes: &[u8]) -> Result<Vec<RawRow>, SourceReadError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or(SourceReadError::EmptyWorkbook)??;

    let mut sheet_rows = range.rows();
    let heading_row = sheet_rows.next().ok_or(SourceReadError::MissingHeadings)?;
    let headings = headings(heading_row.iter().map(cell_text))?;

    Ok(sheet_rows
        .map(|cells| {
            let cells: Vec<String> = cells.iter().map(cell_text).collect();
            RawRow::from_cells(&headings, &cells)
        })
        .collect())
}

/// Render a spreadsheet cell the way it would appear in a CSV export.
fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", *f as i64),
        Data::Float(f) => f.to_string(),
        Data::Bool(b) => b.to_string(),
        Data::DateTime(_) => cell
            .as_date()
            .map(|date| date.format("%Y-%m-%d").to_string())
            .unwrap_or_default(),
        Data::Error(e) => e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use inkwell_test_utils::CsvFixture;

    #[test]
    fn test_format_from_file_name() {
        assert_eq!(SourceFormat::from_file_name("users.CSV").unwrap(), SourceFormat::Csv);
        assert_eq!(SourceFormat::from_file_name("a.b.xlsx").unwrap(), SourceFormat::Xlsx);
        assert_eq!(SourceFormat::from_file_name("old.xls").unwrap(), SourceFormat::Xls);
        assert!(SourceFormat::from_file_name("notes.txt").is_err());
        assert!(SourceFormat::from_file_name("noext").is_err());
    }

    #[test]
    fn test_csv_headings_are_normalised_and_blank_rows_dropped() {
        let bytes = CsvFixture::new(["Name", "Date of Birth"])
            .row(["Ada", "1990-01-15"])
            .row(["", ""])
            .row([" Grace ", "1985-12-09"])
            .to_bytes();

        let rows = read_rows(&bytes, SourceFormat::Csv).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get("date_of_birth"), Some("1990-01-15"));
        assert_eq!(rows[1].get("name"), Some("Grace"));
    }

    #[test]
    fn test_ragged_csv_is_a_read_error() {
        let bytes = b"name,email\nAda\n";
        assert!(matches!(
            read_rows(bytes, SourceFormat::Csv),
            Err(SourceReadError::Csv(_))
        ));
    }

    #[test]
    fn test_empty_file_has_no_headings() {
        assert!(matches!(
            read_rows(b"", SourceFormat::Csv),
            Err(SourceReadError::MissingHeadings)
        ));
    }

    #[test]
    fn test_garbage_workbook_is_a_read_error() {
        assert!(read_rows(b"definitely not a zip", SourceFormat::Xlsx).is_err());
    }

    #[test]
    fn test_cell_text() {
        assert_eq!(cell_text(&Data::Float(771234567.0)), "771234567");
        assert_eq!(cell_text(&Data::Float(1.5)), "1.5");
        assert_eq!(cell_text(&Data::Int(7)), "7");
        assert_eq!(cell_text(&Data::Empty), "");
    }
}
