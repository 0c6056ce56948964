//! Width metrics and text sanitizing for the built-in Helvetica faces.
//!
//! The built-in PDF fonts carry no embedded metrics, so line wrapping needs
//! the standard AFM advance widths (thousandths of an em at the given size).

/// Points to millimeters (1 pt = 1/72 inch).
pub const PT_TO_MM: f64 = 25.4 / 72.0;

/// Bullet glyph used for list items.
pub const BULLET: char = '\u{2022}';

const FALLBACK_WIDTH: u16 = 556;
const BULLET_WIDTH: u16 = 350;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontStyle {
    Regular,
    Bold,
    Oblique,
    BoldOblique,
}

impl FontStyle {
    pub fn from_flags(bold: bool, italic: bool) -> Self {
        match (bold, italic) {
            (false, false) => FontStyle::Regular,
            (true, false) => FontStyle::Bold,
            (false, true) => FontStyle::Oblique,
            (true, true) => FontStyle::BoldOblique,
        }
    }
}

/// Helvetica advance widths for ASCII 0x20..=0x7E.
/// The oblique face shares these.
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // 0x20..
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556, // 0x30..
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, // 0x40..
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556, // 0x50..
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, // 0x60..
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584, // 0x70..0x7E
];

/// Helvetica-Bold advance widths for ASCII 0x20..=0x7E.
/// The bold oblique face shares these.
const HELVETICA_BOLD_WIDTHS: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278, // 0x20..
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611, // 0x30..
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778, // 0x40..
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556, // 0x50..
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611, // 0x60..
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584, // 0x70..0x7E
];

pub(crate) fn char_width_units(c: char, style: FontStyle) -> u16 {
    let table = match style {
        FontStyle::Regular | FontStyle::Oblique => &HELVETICA_WIDTHS,
        FontStyle::Bold | FontStyle::BoldOblique => &HELVETICA_BOLD_WIDTHS,
    };
    let code = c as u32;
    if (0x20..=0x7E).contains(&code) {
        table[(code - 0x20) as usize]
    } else if c == BULLET {
        BULLET_WIDTH
    } else {
        FALLBACK_WIDTH
    }
}

/// Width of a line of text in millimeters at the given point size.
pub fn text_width_mm(text: &str, style: FontStyle, size_pt: f64) -> f64 {
    let units: u64 = text
        .chars()
        .map(|c| char_width_units(c, style) as u64)
        .sum();
    units as f64 / 1000.0 * size_pt * PT_TO_MM
}

/// Map text onto what the built-in fonts can actually draw.
///
/// Latin-1 passes through, common typographic punctuation is transliterated,
/// and anything else becomes `?` rather than an invisible glyph.
pub fn sanitize_line(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\u{2018}' | '\u{2019}' | '\u{201A}' | '\u{2032}' => out.push('\''),
            '\u{201C}' | '\u{201D}' | '\u{201E}' | '\u{2033}' => out.push('"'),
            '\u{2010}' | '\u{2011}' | '\u{2013}' | '\u{2014}' | '\u{2212}' => out.push('-'),
            '\u{2026}' => out.push_str("..."),
            '\u{00A0}' | '\u{2009}' | '\u{202F}' => out.push(' '),
            BULLET => out.push(BULLET),
            c if (c as u32) < 0x20 => out.push(' '),
            '\u{7F}'..='\u{9F}' => out.push('?'),
            c if c.is_ascii() => out.push(c),
            c if (c as u32) <= 0xFF => out.push(c),
            _ => out.push('?'),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_widths() {
        assert_eq!(char_width_units('A', FontStyle::Regular), 667);
        assert_eq!(char_width_units('A', FontStyle::Bold), 722);
        assert_eq!(char_width_units(' ', FontStyle::Regular), 278);
        assert_eq!(char_width_units(' ', FontStyle::Bold), 278);
        assert_eq!(char_width_units('~', FontStyle::Regular), 584);
        assert_eq!(char_width_units(BULLET, FontStyle::Regular), 350);
    }

    #[test]
    fn test_oblique_shares_regular_metrics() {
        assert_eq!(
            char_width_units('W', FontStyle::Oblique),
            char_width_units('W', FontStyle::Regular)
        );
        assert_eq!(
            char_width_units('W', FontStyle::BoldOblique),
            char_width_units('W', FontStyle::Bold)
        );
    }

    #[test]
    fn test_unknown_chars_get_fallback_width() {
        assert_eq!(char_width_units('\u{4E2D}', FontStyle::Regular), 556);
    }

    #[test]
    fn test_text_width() {
        assert_eq!(text_width_mm("", FontStyle::Regular, 12.0), 0.0);
        let narrow = text_width_mm("iii", FontStyle::Regular, 12.0);
        let wide = text_width_mm("mmm", FontStyle::Regular, 12.0);
        assert!(narrow < wide);

        // "Hi" = 722 + 222 units at 10pt.
        let expected = 0.944 * 10.0 * PT_TO_MM;
        assert!((text_width_mm("Hi", FontStyle::Regular, 10.0) - expected).abs() < 1e-9);
    }

    #[test]
    fn test_sanitize_transliterates_punctuation() {
        assert_eq!(sanitize_line("\u{201C}it\u{2019}s\u{201D}"), "\"it's\"");
        assert_eq!(sanitize_line("wait\u{2026}"), "wait...");
        assert_eq!(sanitize_line("pre\u{2013}war"), "pre-war");
    }

    #[test]
    fn test_sanitize_keeps_latin1_and_bullet() {
        assert_eq!(sanitize_line("caf\u{E9} \u{2022} na\u{EF}ve"), "café • naïve");
    }

    #[test]
    fn test_sanitize_replaces_unmappable() {
        assert_eq!(sanitize_line("\u{4E2D}\u{6587}"), "??");
        assert_eq!(sanitize_line("tab\there"), "tab here");
    }
}
