use super::{ExportError, ExportRenderer, ExportResult, Report};
use rust_xlsxwriter::{Format, Workbook, XlsxError};

/// Excel workbook with a bold heading row and one row per record.
#[derive(Debug, Clone, Copy, Default)]
pub struct XlsxRenderer;

impl From<XlsxError> for ExportError {
    fn from(e: XlsxError) -> Self {
        ExportError::Render(e.to_string())
    }
}

impl ExportRenderer for XlsxRenderer {
    fn render(&self, report: &Report) -> ExportResult<Vec<u8>> {
        let mut workbook = Workbook::new();
        let bold = Format::new().set_bold();

        let sheet = workbook.add_worksheet();
        sheet.set_name(report.subject)?;

        for (col, heading) in report.heading.iter().enumerate() {
            sheet.write_string_with_format(0, col as u16, *heading, &bold)?;
        }
        for (index, row) in report.rows.iter().enumerate() {
            let row_num = index as u32 + 1;
            for (col, value) in row.iter().enumerate() {
                sheet.write_string(row_num, col as u16, value.as_str())?;
            }
        }
        sheet.autofit();

        Ok(workbook.save_to_buffer()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::report::tests::{at, sample_post};
    use calamine::{Reader, Xlsx};
    use std::io::Cursor;

    #[test]
    fn test_renders_workbook_with_heading() {
        let report = Report::posts(&[sample_post("body", &["Rust"])], at());
        let bytes = XlsxRenderer.render(&report).unwrap();
        assert!(bytes.starts_with(b"PK"));

        let mut workbook: Xlsx<_> = Xlsx::new(Cursor::new(bytes)).unwrap();
        let range = workbook.worksheet_range("Posts").unwrap();
        assert_eq!(range.height(), 2);
        assert_eq!(range.get_value((0, 1)).unwrap().to_string(), "Title");
        assert_eq!(range.get_value((1, 4)).unwrap().to_string(), "Rust");
    }
}
