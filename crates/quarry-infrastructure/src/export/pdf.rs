//! PDF rendering of a final report.
//!
//! Rendering is split in two: [`layout`] turns the report into positioned
//! lines on pages (pure and deterministic), and [`PdfExporter::render`] draws
//! that layout with printpdf. Every input line becomes one paragraph; long
//! paragraphs wrap and pages break automatically.

use std::path::Path;

use printpdf::{BuiltinFont, IndirectFontRef, Mm, PdfDocument};
use quarry_core::{QuarryError, Result};

pub const REPORT_FILE_NAME: &str = "research_report.pdf";
pub const REPORT_MIME_TYPE: &str = "application/pdf";

/// Page geometry and type sizes, in millimetres and points.
#[derive(Debug, Clone, PartialEq)]
pub struct PageGeometry {
    pub width_mm: f32,
    pub height_mm: f32,
    pub margin_mm: f32,
    pub body_size_pt: f32,
    pub heading_size_pt: f32,
    pub line_height_mm: f32,
    pub paragraph_gap_mm: f32,
    /// Characters per wrapped body line
    pub wrap_width: usize,
}

impl PageGeometry {
    /// US Letter with one-inch margins.
    pub fn letter() -> Self {
        Self {
            width_mm: 215.9,
            height_mm: 279.4,
            margin_mm: 25.4,
            body_size_pt: 10.0,
            heading_size_pt: 13.0,
            line_height_mm: 5.0,
            paragraph_gap_mm: 2.1,
            wrap_width: 95,
        }
    }
}

impl Default for PageGeometry {
    fn default() -> Self {
        Self::letter()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineStyle {
    Heading,
    Body,
}

/// One drawn line.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedLine {
    pub text: String,
    pub style: LineStyle,
    /// Baseline distance from the bottom edge
    pub y_mm: f32,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LaidOutPage {
    pub lines: Vec<PlacedLine>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentLayout {
    pub pages: Vec<LaidOutPage>,
}

impl DocumentLayout {
    /// Every drawn line's text, in reading order.
    pub fn text_lines(&self) -> Vec<&str> {
        self.pages
            .iter()
            .flat_map(|page| page.lines.iter().map(|line| line.text.as_str()))
            .collect()
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }
}

/// Lays out `report` on pages.
pub fn layout(report: &str, geometry: &PageGeometry) -> DocumentLayout {
    let top = geometry.height_mm - geometry.margin_mm;
    let bottom = geometry.margin_mm;

    let mut pages = vec![LaidOutPage::default()];
    let mut y = top;

    for raw_line in report.lines() {
        let (style, text) = classify(raw_line);

        for wrapped in wrap(&text, geometry.wrap_width) {
            if y - geometry.line_height_mm < bottom {
                pages.push(LaidOutPage::default());
                y = top;
            }
            y -= geometry.line_height_mm;
            if let Some(page) = pages.last_mut() {
                page.lines.push(PlacedLine {
                    text: wrapped,
                    style,
                    y_mm: y,
                });
            }
        }
        y -= geometry.paragraph_gap_mm;
    }

    DocumentLayout { pages }
}

/// Markdown headings become heading lines without their `#` markers.
fn classify(line: &str) -> (LineStyle, String) {
    let trimmed = line.trim_end();
    let stripped = trimmed.trim_start_matches('#');
    if stripped.len() != trimmed.len() && (stripped.is_empty() || stripped.starts_with(' ')) {
        (LineStyle::Heading, sanitize(stripped.trim()))
    } else {
        (LineStyle::Body, sanitize(trimmed))
    }
}

/// The builtin PDF fonts only cover Latin-1; anything else is replaced.
fn sanitize(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '\u{2018}' | '\u{2019}' => '\'',
            '\u{201C}' | '\u{201D}' => '"',
            '\u{2013}' | '\u{2014}' => '-',
            '\u{2022}' => '*',
            '\t' => ' ',
            c if (c as u32) < 0x20 => ' ',
            c if (c as u32) <= 0xFF => c,
            _ => '?',
        })
        .collect()
}

/// Greedy word wrap; words longer than `width` are split.
fn wrap(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let mut word: Vec<char> = word.chars().collect();
        while word.len() > width {
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            let rest = word.split_off(width);
            lines.push(word.into_iter().collect());
            word = rest;
        }
        let word: String = word.into_iter().collect();
        let needed = if current.is_empty() {
            word.chars().count()
        } else {
            current.chars().count() + 1 + word.chars().count()
        };
        if needed > width && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(&word);
    }

    if !current.is_empty() || lines.is_empty() {
        lines.push(current);
    }
    lines
}

/// Renders reports to PDF bytes.
#[derive(Debug, Clone, Default)]
pub struct PdfExporter {
    geometry: PageGeometry,
}

impl PdfExporter {
    pub fn new(geometry: PageGeometry) -> Self {
        Self { geometry }
    }

    pub fn geometry(&self) -> &PageGeometry {
        &self.geometry
    }

    /// Lays out `report` with this exporter's geometry.
    pub fn layout(&self, report: &str) -> DocumentLayout {
        layout(report, &self.geometry)
    }

    /// Renders `report` to an in-memory PDF.
    pub fn render(&self, report: &str) -> Result<Vec<u8>> {
        let document_layout = self.layout(report);
        let g = &self.geometry;

        let (doc, first_page, first_layer) =
            PdfDocument::new("Research Report", Mm(g.width_mm), Mm(g.height_mm), "Layer 1");
        let body_font = add_font(&doc, BuiltinFont::Helvetica)?;
        let heading_font = add_font(&doc, BuiltinFont::HelveticaBold)?;

        for (index, page) in document_layout.pages.iter().enumerate() {
            let (page_index, layer_index) = if index == 0 {
                (first_page, first_layer)
            } else {
                doc.add_page(Mm(g.width_mm), Mm(g.height_mm), "Layer 1")
            };
            let layer = doc.get_page(page_index).get_layer(layer_index);

            for line in &page.lines {
                let (font, size) = match line.style {
                    LineStyle::Heading => (&heading_font, g.heading_size_pt),
                    LineStyle::Body => (&body_font, g.body_size_pt),
                };
                layer.use_text(line.text.clone(), size, Mm(g.margin_mm), Mm(line.y_mm), font);
            }
        }

        tracing::debug!(
            pages = document_layout.page_count(),
            "[PdfExporter] Rendered report"
        );

        doc.save_to_bytes()
            .map_err(|err| QuarryError::export(format!("Failed to serialize PDF: {err}")))
    }

    /// Renders `report` and writes it to `path`.
    pub fn write_to(&self, report: &str, path: &Path) -> Result<()> {
        let bytes = self.render(report)?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, bytes)?;
        tracing::info!("[PdfExporter] Wrote {}", path.display());
        Ok(())
    }
}

fn add_font(
    doc: &printpdf::PdfDocumentReference,
    font: BuiltinFont,
) -> Result<IndirectFontRef> {
    doc.add_builtin_font(font)
        .map_err(|err| QuarryError::export(format!("Failed to load builtin font: {err}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    const REPORT: &str = "# Research Report on renewable energy\n\n\
        ## 1. Background\n\
        Solar capacity grew quickly in 2023 and wind followed.\n\n\
        ## References\n\
        1. IEA Renewables - https://www.iea.org/renewables\n";

    #[test]
    fn test_layout_is_deterministic() {
        let geometry = PageGeometry::letter();
        let first = layout(REPORT, &geometry);
        let second = layout(REPORT, &geometry);
        assert_eq!(first, second);
        assert_eq!(first.text_lines(), second.text_lines());
    }

    #[test]
    fn test_one_paragraph_per_line() {
        let doc = layout(REPORT, &PageGeometry::letter());
        let lines = doc.text_lines();
        assert_eq!(lines[0], "Research Report on renewable energy");
        assert_eq!(lines[1], "");
        assert_eq!(lines[2], "1. Background");
        assert_eq!(doc.pages[0].lines[2].style, LineStyle::Heading);
        assert_eq!(doc.pages[0].lines[3].style, LineStyle::Body);
        assert_eq!(lines.len(), REPORT.lines().count());
    }

    #[test]
    fn test_long_report_paginates() {
        let report = (0..200)
            .map(|i| format!("Line number {i}"))
            .collect::<Vec<_>>()
            .join("\n");
        let geometry = PageGeometry::letter();
        let doc = layout(&report, &geometry);

        assert!(doc.page_count() > 1);
        assert_eq!(doc.text_lines().len(), 200);
        for page in &doc.pages {
            for line in &page.lines {
                assert!(line.y_mm >= geometry.margin_mm);
            }
        }
    }

    #[test]
    fn test_wrap_keeps_all_words() {
        let text = "alpha beta gamma delta epsilon zeta eta theta iota kappa";
        let wrapped = wrap(text, 12);
        assert!(wrapped.iter().all(|l| l.chars().count() <= 12));
        assert_eq!(wrapped.join(" "), text);

        let long = wrap("abcdefghijklmnopqrstuvwxyz", 10);
        assert_eq!(long, vec!["abcdefghij", "klmnopqrst", "uvwxyz"]);
    }

    #[test]
    fn test_hashtag_is_not_heading() {
        let (style, text) = classify("#hashtag trends");
        assert_eq!(style, LineStyle::Body);
        assert_eq!(text, "#hashtag trends");
    }

    #[test]
    fn test_sanitize_replaces_non_latin1() {
        assert_eq!(sanitize("“quoted” — ok ✓"), "\"quoted\" - ok ?");
    }

    #[test]
    fn test_render_produces_pdf_bytes() {
        let bytes = PdfExporter::default().render(REPORT).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }
}
