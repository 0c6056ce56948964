//! PDF rendering of the summary report.
//!
//! Lays out an A4 document with a repeated title header, page-number footer,
//! bold topic headings, and wrapped body text parsed from the formatting
//! pass's HTML. Uses the built-in Helvetica faces so the output needs no
//! font files.

mod fonts;
mod html;

pub use fonts::{sanitize_line, text_width_mm, FontStyle};
pub use html::{parse_blocks, Block, Span};

use crate::error::{ReferatError, Result};
use fonts::{BULLET, PT_TO_MM};
use printpdf::{
    BuiltinFont, Color, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference, PdfLayerIndex,
    PdfLayerReference, PdfPageIndex, Rgb,
};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

const PAGE_WIDTH_MM: f64 = 210.0;
const PAGE_HEIGHT_MM: f64 = 297.0;
const MARGIN_MM: f64 = 10.0;
const TEXT_WIDTH_MM: f64 = PAGE_WIDTH_MM - 2.0 * MARGIN_MM;
const HEADER_BASELINE_MM: f64 = PAGE_HEIGHT_MM - 16.0;
const BODY_TOP_MM: f64 = PAGE_HEIGHT_MM - 22.0;
const BODY_BOTTOM_MM: f64 = 15.0;
const FOOTER_BASELINE_MM: f64 = 10.0;

const TITLE_SIZE_PT: f64 = 14.0;
const HEADING_SIZE_PT: f64 = 13.0;
const BODY_SIZE_PT: f64 = 12.0;
const FOOTER_SIZE_PT: f64 = 10.0;

const LINE_FACTOR: f64 = 1.4;
const PARAGRAPH_GAP_MM: f64 = 2.0;
const TOPIC_GAP_MM: f64 = 5.0;
const BULLET_INDENT_MM: f64 = 6.0;

fn line_height_mm(size_pt: f64) -> f64 {
    size_pt * LINE_FACTOR * PT_TO_MM
}

struct Faces {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    oblique: IndirectFontRef,
    bold_oblique: IndirectFontRef,
}

impl Faces {
    fn for_style(&self, style: FontStyle) -> &IndirectFontRef {
        match style {
            FontStyle::Regular => &self.regular,
            FontStyle::Bold => &self.bold,
            FontStyle::Oblique => &self.oblique,
            FontStyle::BoldOblique => &self.bold_oblique,
        }
    }
}

/// An A4 summary document under construction.
pub struct SummaryPdf {
    doc: PdfDocumentReference,
    faces: Faces,
    title: String,
    page: PdfPageIndex,
    layer: PdfLayerIndex,
    page_number: usize,
    /// Baseline (mm from the bottom edge) where the next line lands.
    y: f64,
    topics: usize,
}

impl SummaryPdf {
    pub fn new(title: &str) -> Result<Self> {
        let (doc, page, layer) =
            PdfDocument::new(title, Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "Layer 1");
        let faces = Faces {
            regular: doc
                .add_builtin_font(BuiltinFont::Helvetica)
                .map_err(|e| ReferatError::Pdf(e.to_string()))?,
            bold: doc
                .add_builtin_font(BuiltinFont::HelveticaBold)
                .map_err(|e| ReferatError::Pdf(e.to_string()))?,
            oblique: doc
                .add_builtin_font(BuiltinFont::HelveticaOblique)
                .map_err(|e| ReferatError::Pdf(e.to_string()))?,
            bold_oblique: doc
                .add_builtin_font(BuiltinFont::HelveticaBoldOblique)
                .map_err(|e| ReferatError::Pdf(e.to_string()))?,
        };
        let mut pdf = Self {
            doc,
            faces,
            title: sanitize_line(title),
            page,
            layer,
            page_number: 1,
            y: BODY_TOP_MM,
            topics: 0,
        };
        pdf.draw_chrome();
        Ok(pdf)
    }

    pub fn page_count(&self) -> usize {
        self.page_number
    }

    /// Render one topic: bold heading, then the HTML blocks beneath it.
    pub fn add_topic(&mut self, topic: &str, html: &str) {
        if self.topics > 0 {
            self.y -= TOPIC_GAP_MM;
        }
        self.topics += 1;

        // Keep the heading on the same page as the first body line.
        if self.y - line_height_mm(HEADING_SIZE_PT) < BODY_BOTTOM_MM {
            self.new_page();
        }
        let heading = [Span {
            text: topic.to_string(),
            bold: true,
            italic: false,
        }];
        for line in wrap_words(
            tokenize(&heading, HEADING_SIZE_PT),
            TEXT_WIDTH_MM,
            HEADING_SIZE_PT,
        ) {
            self.draw_line(&line, MARGIN_MM, HEADING_SIZE_PT);
        }

        for block in parse_blocks(html) {
            match block {
                Block::Paragraph(spans) => {
                    for line in wrap_words(
                        tokenize(&spans, BODY_SIZE_PT),
                        TEXT_WIDTH_MM,
                        BODY_SIZE_PT,
                    ) {
                        self.draw_line(&line, MARGIN_MM, BODY_SIZE_PT);
                    }
                }
                Block::Bullet(spans) => {
                    let max_width = TEXT_WIDTH_MM - BULLET_INDENT_MM;
                    let lines =
                        wrap_words(tokenize(&spans, BODY_SIZE_PT), max_width, BODY_SIZE_PT);
                    for (index, line) in lines.iter().enumerate() {
                        if index == 0 {
                            // Marker and first line share a baseline.
                            if self.y < BODY_BOTTOM_MM {
                                self.new_page();
                            }
                            self.layer_ref().use_text(
                                BULLET.to_string(),
                                BODY_SIZE_PT,
                                Mm(MARGIN_MM),
                                Mm(self.y),
                                &self.faces.regular,
                            );
                        }
                        self.draw_line(line, MARGIN_MM + BULLET_INDENT_MM, BODY_SIZE_PT);
                    }
                }
            }
            self.y -= PARAGRAPH_GAP_MM;
        }
    }

    pub fn save(self, path: &Path) -> Result<()> {
        let file = File::create(path)?;
        self.doc
            .save(&mut BufWriter::new(file))
            .map_err(|e| ReferatError::Pdf(e.to_string()))
    }

    fn layer_ref(&self) -> PdfLayerReference {
        self.doc.get_page(self.page).get_layer(self.layer)
    }

    fn new_page(&mut self) {
        let (page, layer) = self.doc.add_page(Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "Layer 1");
        self.page = page;
        self.layer = layer;
        self.page_number += 1;
        self.y = BODY_TOP_MM;
        self.draw_chrome();
    }

    /// Title header and page-number footer for the current page.
    fn draw_chrome(&self) {
        let layer = self.layer_ref();

        let title_width = text_width_mm(&self.title, FontStyle::Bold, TITLE_SIZE_PT);
        let title_x = ((PAGE_WIDTH_MM - title_width) / 2.0).max(MARGIN_MM);
        layer.set_fill_color(Color::Rgb(Rgb::new(0.0, 0.0, 1.0, None)));
        layer.use_text(
            self.title.clone(),
            TITLE_SIZE_PT,
            Mm(title_x),
            Mm(HEADER_BASELINE_MM),
            &self.faces.bold,
        );
        layer.set_fill_color(Color::Rgb(Rgb::new(0.0, 0.0, 0.0, None)));

        let footer = format!("Page {}", self.page_number);
        let footer_width = text_width_mm(&footer, FontStyle::Oblique, FOOTER_SIZE_PT);
        let footer_x = (PAGE_WIDTH_MM - footer_width) / 2.0;
        layer.use_text(
            footer,
            FOOTER_SIZE_PT,
            Mm(footer_x),
            Mm(FOOTER_BASELINE_MM),
            &self.faces.oblique,
        );
    }

    fn draw_line(&mut self, line: &[WordToken], x_left: f64, size_pt: f64) {
        if self.y < BODY_BOTTOM_MM {
            self.new_page();
        }
        let layer = self.layer_ref();
        let space_width = text_width_mm(" ", FontStyle::Regular, size_pt);
        let mut x = x_left;
        for word in line {
            for piece in &word.pieces {
                layer.use_text(
                    piece.text.clone(),
                    size_pt,
                    Mm(x),
                    Mm(self.y),
                    self.faces.for_style(piece.style),
                );
                x += text_width_mm(&piece.text, piece.style, size_pt);
            }
            x += space_width;
        }
        self.y -= line_height_mm(size_pt);
    }
}

/// A styled fragment within one word.
#[derive(Debug)]
struct Piece {
    text: String,
    style: FontStyle,
}

/// One unbreakable word, possibly spanning style changes.
#[derive(Debug)]
struct WordToken {
    pieces: Vec<Piece>,
    width: f64,
}

fn build_word(pieces: Vec<Piece>, size_pt: f64) -> WordToken {
    let width = pieces
        .iter()
        .map(|p| text_width_mm(&p.text, p.style, size_pt))
        .sum();
    WordToken { pieces, width }
}

/// Break spans into words. Style boundaries inside a word do not split it.
fn tokenize(spans: &[Span], size_pt: f64) -> Vec<WordToken> {
    let mut words = Vec::new();
    let mut current: Vec<Piece> = Vec::new();
    for span in spans {
        let style = FontStyle::from_flags(span.bold, span.italic);
        for c in sanitize_line(&span.text).chars() {
            if c == ' ' {
                if !current.is_empty() {
                    words.push(build_word(std::mem::take(&mut current), size_pt));
                }
            } else {
                match current.last_mut() {
                    Some(piece) if piece.style == style => piece.text.push(c),
                    _ => current.push(Piece {
                        text: c.to_string(),
                        style,
                    }),
                }
            }
        }
    }
    if !current.is_empty() {
        words.push(build_word(current, size_pt));
    }
    words
}

/// Greedy fill of words into lines no wider than `max_width` millimeters.
fn wrap_words(words: Vec<WordToken>, max_width: f64, size_pt: f64) -> Vec<Vec<WordToken>> {
    let space_width = text_width_mm(" ", FontStyle::Regular, size_pt);
    let mut lines = Vec::new();
    let mut line: Vec<WordToken> = Vec::new();
    let mut width = 0.0;

    for word in words {
        if word.width > max_width {
            if !line.is_empty() {
                lines.push(std::mem::take(&mut line));
                width = 0.0;
            }
            let mut chunks = split_oversized(word, max_width, size_pt);
            let last = chunks.pop();
            for chunk in chunks {
                lines.push(vec![chunk]);
            }
            if let Some(last) = last {
                width = last.width;
                line.push(last);
            }
            continue;
        }

        let needed = if line.is_empty() {
            word.width
        } else {
            width + space_width + word.width
        };
        if !line.is_empty() && needed > max_width {
            lines.push(std::mem::take(&mut line));
            width = word.width;
        } else {
            width = needed;
        }
        line.push(word);
    }
    if !line.is_empty() {
        lines.push(line);
    }
    lines
}

/// Hard-break a word wider than the whole line (URLs, mostly).
fn split_oversized(word: WordToken, max_width: f64, size_pt: f64) -> Vec<WordToken> {
    let mut chunks = Vec::new();
    let mut pieces: Vec<Piece> = Vec::new();
    let mut width = 0.0;
    for piece in word.pieces {
        for c in piece.text.chars() {
            let char_width = text_width_mm(&c.to_string(), piece.style, size_pt);
            if width + char_width > max_width && width > 0.0 {
                chunks.push(WordToken {
                    pieces: std::mem::take(&mut pieces),
                    width,
                });
                width = 0.0;
            }
            match pieces.last_mut() {
                Some(last) if last.style == piece.style => last.text.push(c),
                _ => pieces.push(Piece {
                    text: c.to_string(),
                    style: piece.style,
                }),
            }
            width += char_width;
        }
    }
    if !pieces.is_empty() {
        chunks.push(WordToken { pieces, width });
    }
    chunks
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_build_and_save() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("lecture_summary.pdf");

        let mut pdf = SummaryPdf::new("GDPR Lecture transcript").unwrap();
        pdf.add_topic(
            "Scope of the regulation",
            "<p>Applies to <b>personal data</b> processing.</p>\
             <ul><li>Material scope</li><li>Territorial scope</li></ul>",
        );
        pdf.add_topic("Penalties", "<p>Fines up to 4% of global turnover.</p>");
        assert_eq!(pdf.page_count(), 1);

        pdf.save(&path).unwrap();
        let bytes = std::fs::read(&path).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
        assert!(bytes.len() > 500);
    }

    #[test]
    fn test_long_content_paginates() {
        let mut pdf = SummaryPdf::new("Four hour seminar").unwrap();
        let body = "<p>This sentence repeats until the page overflows.</p>".repeat(60);
        pdf.add_topic("Endless topic", &body);
        assert!(pdf.page_count() > 1);

        let dir = tempdir().unwrap();
        let path = dir.path().join("long_summary.pdf");
        pdf.save(&path).unwrap();
        assert!(std::fs::read(&path).unwrap().starts_with(b"%PDF"));
    }

    #[test]
    fn test_wrap_respects_width() {
        let spans = [Span {
            text: "alpha beta gamma delta epsilon zeta".to_string(),
            bold: false,
            italic: false,
        }];
        let words = tokenize(&spans, BODY_SIZE_PT);
        assert_eq!(words.len(), 6);

        let max_width = 25.0;
        let lines = wrap_words(words, max_width, BODY_SIZE_PT);
        assert!(lines.len() > 1);
        let space = text_width_mm(" ", FontStyle::Regular, BODY_SIZE_PT);
        for line in &lines {
            let total: f64 = line.iter().map(|w| w.width).sum::<f64>()
                + space * (line.len() - 1) as f64;
            assert!(total <= max_width + 1e-6);
        }
    }

    #[test]
    fn test_oversized_word_is_hard_broken() {
        let spans = [Span {
            text: "x".repeat(300),
            bold: false,
            italic: false,
        }];
        let lines = wrap_words(tokenize(&spans, BODY_SIZE_PT), TEXT_WIDTH_MM, BODY_SIZE_PT);
        assert!(lines.len() > 1);
        for line in &lines {
            assert!(line.iter().map(|w| w.width).sum::<f64>() <= TEXT_WIDTH_MM + 1e-6);
        }
    }

    #[test]
    fn test_style_change_does_not_split_word() {
        let spans = [
            Span {
                text: "un".to_string(),
                bold: false,
                italic: false,
            },
            Span {
                text: "breakable".to_string(),
                bold: true,
                italic: false,
            },
        ];
        let words = tokenize(&spans, BODY_SIZE_PT);
        assert_eq!(words.len(), 1);
        assert_eq!(words[0].pieces.len(), 2);
        assert_eq!(words[0].pieces[0].text, "un");
        assert_eq!(words[0].pieces[1].text, "breakable");
    }
}
