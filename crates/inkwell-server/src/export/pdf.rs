use super::{ExportError, ExportRenderer, ExportResult, Report};
use printpdf::{BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfLayerReference};

const PAGE_WIDTH: f32 = 297.0;
const PAGE_HEIGHT: f32 = 210.0;
const MARGIN: f32 = 12.0;
const LINE_HEIGHT: f32 = 6.0;
const FONT_SIZE: f32 = 9.0;

/// Landscape A4 report, one line per record.
#[derive(Debug, Clone)]
pub struct PdfRenderer {
    /// Longest cell kept on a line before it is cut.
    pub max_cell_chars: usize,
}

impl Default for PdfRenderer {
    fn default() -> Self {
        Self { max_cell_chars: 40 }
    }
}

struct Cursor {
    layer: PdfLayerReference,
    y: f32,
}

impl PdfRenderer {
    fn line(&self, cells: &[String]) -> String {
        cells
            .iter()
            .map(|cell| {
                if cell.chars().count() > self.max_cell_chars {
                    cell.chars().take(self.max_cell_chars).collect()
                } else {
                    cell.clone()
                }
            })
            .collect::<Vec<String>>()
            .join(" | ")
    }
}

fn render_error(e: impl std::fmt::Display) -> ExportError {
    ExportError::Render(e.to_string())
}

impl ExportRenderer for PdfRenderer {
    fn render(&self, report: &Report) -> ExportResult<Vec<u8>> {
        let (doc, page, layer) =
            PdfDocument::new(report.title, Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
        let regular: IndirectFontRef = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(render_error)?;
        let bold: IndirectFontRef = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(render_error)?;

        let mut cursor = Cursor {
            layer: doc.get_page(page).get_layer(layer),
            y: PAGE_HEIGHT - MARGIN,
        };

        cursor.layer.use_text(report.title, 16.0, Mm(MARGIN), Mm(cursor.y), &bold);
        cursor.y -= LINE_HEIGHT * 1.5;
        for text in [report.generated_line(), report.total_line()] {
            cursor.layer.use_text(text, FONT_SIZE, Mm(MARGIN), Mm(cursor.y), &regular);
            cursor.y -= LINE_HEIGHT;
        }
        cursor.y -= LINE_HEIGHT;

        let heading: Vec<String> = report.heading.iter().map(|h| h.to_string()).collect();
        let heading_line = self.line(&heading);
        cursor
            .layer
            .use_text(heading_line.clone(), FONT_SIZE, Mm(MARGIN), Mm(cursor.y), &bold);
        cursor.y -= LINE_HEIGHT;

        for row in &report.rows {
            if cursor.y < MARGIN {
                let (page, layer) = doc.add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
                cursor = Cursor {
                    layer: doc.get_page(page).get_layer(layer),
                    y: PAGE_HEIGHT - MARGIN,
                };
                cursor
                    .layer
                    .use_text(heading_line.clone(), FONT_SIZE, Mm(MARGIN), Mm(cursor.y), &bold);
                cursor.y -= LINE_HEIGHT;
            }
            cursor
                .layer
                .use_text(self.line(row), FONT_SIZE, Mm(MARGIN), Mm(cursor.y), &regular);
            cursor.y -= LINE_HEIGHT;
        }

        doc.save_to_bytes().map_err(render_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::report::tests::{at, sample_post, sample_user};

    #[test]
    fn test_renders_pdf_bytes() {
        let report = Report::users(&[sample_user()], at());
        let bytes = PdfRenderer::default().render(&report).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn test_many_rows_span_pages() {
        let posts: Vec<_> = (0..120).map(|_| sample_post("body", &["Rust"])).collect();
        let report = Report::posts(&posts, at());
        let bytes = PdfRenderer::default().render(&report).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn test_line_cuts_long_cells() {
        let renderer = PdfRenderer { max_cell_chars: 3 };
        assert_eq!(renderer.line(&["abcdef".into(), "x".into()]), "abc | x");
    }
}
