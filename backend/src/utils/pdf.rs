//! Low-level page writer for billing reports.
//!
//! Wraps printpdf's drawing primitives with a top-down cursor, margin-aware
//! pagination, word wrapping, and ASCII sanitization. Layout decisions
//! (which sections appear in which order) live in the report service; this
//! module only guarantees that nothing is clipped at a page boundary.

use printpdf::{
    BuiltinFont, Color, IndirectFontRef, Line, Mm, PaintMode, PdfDocument, PdfDocumentReference,
    PdfLayerReference, Point, Rect, Rgb,
};

use crate::error::AppError;

/// US Letter.
pub const PAGE_WIDTH_MM: f32 = 215.9;
pub const PAGE_HEIGHT_MM: f32 = 279.4;
pub const MARGIN_MM: f32 = 18.0;

/// Table rows are atomic, so they break earlier than running text, which is
/// emitted line by line. Both thresholds leave room for a full row/line plus
/// the footer.
pub const TABLE_BREAK_MM: f32 = 30.0;
pub const TEXT_BREAK_MM: f32 = 24.0;

/// Average Helvetica glyph advance as a fraction of the font size. Good
/// enough for wrapping mixed prose; narrow enough to never overflow the
/// margin.
const AVG_GLYPH_WIDTH: f32 = 0.5;
const PT_TO_MM: f32 = 0.352_778;

pub struct PageWriter {
    doc: PdfDocumentReference,
    layer: PdfLayerReference,
    font: IndirectFontRef,
    font_bold: IndirectFontRef,
    /// Cursor, in mm from the bottom edge. Text is emitted at the cursor and
    /// the cursor moves down.
    y: f32,
    pages: usize,
}

impl PageWriter {
    pub fn new(title: &str) -> Result<Self, AppError> {
        let (doc, page, layer) =
            PdfDocument::new(title, Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "Layer 1");
        let font = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| AppError::InternalServerError(anyhow::anyhow!("pdf font: {}", e)))?;
        let font_bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|e| AppError::InternalServerError(anyhow::anyhow!("pdf font: {}", e)))?;
        let layer = doc.get_page(page).get_layer(layer);
        Ok(Self {
            doc,
            layer,
            font,
            font_bold,
            y: PAGE_HEIGHT_MM - MARGIN_MM,
            pages: 1,
        })
    }

    pub fn cursor(&self) -> f32 {
        self.y
    }

    pub fn pages(&self) -> usize {
        self.pages
    }

    /// Width available to content between the margins.
    pub fn content_width(&self) -> f32 {
        PAGE_WIDTH_MM - 2.0 * MARGIN_MM
    }

    /// Characters that fit on one wrapped line at the given size.
    pub fn chars_per_line(&self, font_size: f32) -> usize {
        let glyph_mm = AVG_GLYPH_WIDTH * font_size * PT_TO_MM;
        (self.content_width() / glyph_mm).floor().max(1.0) as usize
    }

    pub fn new_page(&mut self) {
        let (page, layer) = self
            .doc
            .add_page(Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "Layer 1");
        self.layer = self.doc.get_page(page).get_layer(layer);
        self.y = PAGE_HEIGHT_MM - MARGIN_MM;
        self.pages += 1;
    }

    /// Breaks the page unless `needed` mm still fit above `threshold`.
    pub fn ensure_room(&mut self, needed: f32, threshold: f32) {
        if self.y - needed < threshold {
            self.new_page();
        }
    }

    /// Emits one already-wrapped line at the cursor and advances.
    pub fn text_line(&mut self, text: &str, font_size: f32, x: f32, bold: bool) {
        let font = if bold { &self.font_bold } else { &self.font };
        self.layer
            .use_text(sanitize_text(text), font_size, Mm(x), Mm(self.y), font);
        self.y -= line_height(font_size);
    }

    /// Emits text at an absolute position without moving the cursor. Used for
    /// multi-column table rows and footers.
    pub fn text_at(&mut self, text: &str, font_size: f32, x: f32, y: f32, bold: bool) {
        let font = if bold { &self.font_bold } else { &self.font };
        self.layer
            .use_text(sanitize_text(text), font_size, Mm(x), Mm(y), font);
    }

    pub fn advance(&mut self, mm: f32) {
        self.y -= mm;
    }

    /// Horizontal rule across the content width at the cursor.
    pub fn hline(&mut self, thickness: f32) {
        self.layer.set_outline_thickness(thickness);
        self.layer
            .set_outline_color(Color::Rgb(Rgb::new(0.3, 0.3, 0.3, None)));
        let line = Line {
            points: vec![
                (Point::new(Mm(MARGIN_MM), Mm(self.y)), false),
                (Point::new(Mm(PAGE_WIDTH_MM - MARGIN_MM), Mm(self.y)), false),
            ],
            is_closed: false,
        };
        self.layer.add_line(line);
        self.y -= 2.0;
    }

    /// Horizontal rule between two x positions at the cursor, without
    /// advancing. Used for signature lines.
    pub fn rule(&mut self, x1: f32, x2: f32, thickness: f32) {
        self.layer.set_outline_thickness(thickness);
        self.layer
            .set_outline_color(Color::Rgb(Rgb::new(0.0, 0.0, 0.0, None)));
        let line = Line {
            points: vec![
                (Point::new(Mm(x1), Mm(self.y)), false),
                (Point::new(Mm(x2), Mm(self.y)), false),
            ],
            is_closed: false,
        };
        self.layer.add_line(line);
    }

    /// Filled grey box of the given height starting at the cursor, used for
    /// section headings and the metadata block.
    pub fn fill_box(&mut self, height: f32, shade: f32) {
        let rect = Rect::new(
            Mm(MARGIN_MM),
            Mm(self.y - height + 1.5),
            Mm(PAGE_WIDTH_MM - MARGIN_MM),
            Mm(self.y + 3.0),
        )
        .with_mode(PaintMode::Fill);
        self.layer
            .set_fill_color(Color::Rgb(Rgb::new(shade, shade, shade, None)));
        self.layer.add_rect(rect);
        // Restore the fill color so following text renders black.
        self.layer
            .set_fill_color(Color::Rgb(Rgb::new(0.0, 0.0, 0.0, None)));
    }

    pub fn finish(self) -> Result<Vec<u8>, AppError> {
        self.doc
            .save_to_bytes()
            .map_err(|e| AppError::InternalServerError(anyhow::anyhow!("pdf save: {}", e)))
    }
}

pub fn line_height(font_size: f32) -> f32 {
    font_size * PT_TO_MM * 1.35
}

/// Replaces characters the builtin fonts cannot encode with ASCII
/// equivalents and drops anything else outside printable ASCII. The renderer
/// must never fail on pasted or AI-generated punctuation.
pub fn sanitize_text(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '\u{2018}' | '\u{2019}' | '\u{201A}' | '\u{2032}' => out.push('\''),
            '\u{201C}' | '\u{201D}' | '\u{201E}' | '\u{2033}' => out.push('"'),
            '\u{2013}' | '\u{2014}' | '\u{2015}' => out.push('-'),
            '\u{2026}' => out.push_str("..."),
            '\u{00A0}' | '\u{2007}' | '\u{202F}' => out.push(' '),
            '\u{2022}' => out.push('*'),
            '\t' => out.push_str("    "),
            c if c.is_ascii_graphic() || c == ' ' => out.push(c),
            _ => {}
        }
    }
    out
}

/// Greedy word wrap against a character budget. Words longer than the budget
/// are split hard so they cannot push past the margin.
pub fn wrap_text(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut lines = Vec::new();
    for paragraph in text.split('\n') {
        let paragraph = paragraph.trim_end();
        if paragraph.is_empty() {
            lines.push(String::new());
            continue;
        }
        let mut current = String::new();
        for word in paragraph.split_whitespace() {
            if word.len() > max_chars {
                if !current.is_empty() {
                    lines.push(std::mem::take(&mut current));
                }
                let mut rest = word;
                while rest.len() > max_chars {
                    let (head, tail) = rest.split_at(max_chars);
                    lines.push(head.to_string());
                    rest = tail;
                }
                current = rest.to_string();
                continue;
            }
            if current.is_empty() {
                current = word.to_string();
            } else if current.len() + 1 + word.len() <= max_chars {
                current.push(' ');
                current.push_str(word);
            } else {
                lines.push(std::mem::take(&mut current));
                current = word.to_string();
            }
        }
        if !current.is_empty() {
            lines.push(current);
        }
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_replaces_smart_punctuation() {
        let input = "\u{201C}Hello\u{201D} \u{2014} it\u{2019}s fine\u{2026}";
        assert_eq!(sanitize_text(input), "\"Hello\" - it's fine...");
    }

    #[test]
    fn sanitize_drops_unencodable_characters() {
        let input = "caf\u{00E9} \u{1F600} ok";
        // Non-ASCII letters and emoji are removed rather than failing.
        assert_eq!(sanitize_text(input), "caf  ok");
    }

    #[test]
    fn wrap_respects_budget() {
        let lines = wrap_text("one two three four five", 9);
        assert_eq!(lines, vec!["one two", "three", "four five"]);
        assert!(lines.iter().all(|l| l.len() <= 9));
    }

    #[test]
    fn wrap_splits_overlong_words() {
        let lines = wrap_text("abcdefghij", 4);
        assert_eq!(lines, vec!["abcd", "efgh", "ij"]);
    }

    #[test]
    fn wrap_preserves_blank_paragraphs() {
        let lines = wrap_text("a\n\nb", 10);
        assert_eq!(lines, vec!["a", "", "b"]);
    }

    #[test]
    fn ensure_room_breaks_pages_instead_of_clipping() {
        let mut page = PageWriter::new("pagination").expect("writer");
        for _ in 0..200 {
            page.ensure_room(line_height(10.0), TEXT_BREAK_MM);
            page.text_line("line", 10.0, MARGIN_MM, false);
        }
        assert!(page.pages() > 1);
        assert!(page.cursor() > TEXT_BREAK_MM - line_height(10.0));
        let bytes = page.finish().expect("bytes");
        assert!(bytes.starts_with(b"%PDF"));
    }
}
