//! Minimal HTML reader for the formatting pass output.
//!
//! The model is prompted to emit a small tag set (`<p>`, `<ul><li>`, `<b>`,
//! `<i>`) but drifts; this parser tolerates headings, `<br>`, attributes,
//! and unknown tags, reducing everything to styled paragraph and bullet
//! blocks for the renderer.

use regex::Regex;

/// A run of text with one style.
#[derive(Debug, Clone, PartialEq)]
pub struct Span {
    pub text: String,
    pub bold: bool,
    pub italic: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Paragraph(Vec<Span>),
    Bullet(Vec<Span>),
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum BlockKind {
    Paragraph,
    Bullet,
}

/// Parse an HTML fragment into renderable blocks.
pub fn parse_blocks(html: &str) -> Vec<Block> {
    let tag_re = Regex::new(r"<[^>]+>").expect("Invalid regex");
    let mut parser = Parser::new();
    let mut last_end = 0;
    for m in tag_re.find_iter(html) {
        parser.push_text(&html[last_end..m.start()]);
        parser.handle_tag(m.as_str());
        last_end = m.end();
    }
    parser.push_text(&html[last_end..]);
    parser.flush(BlockKind::Paragraph);
    parser.blocks
}

struct Parser {
    blocks: Vec<Block>,
    spans: Vec<Span>,
    kind: BlockKind,
    bold: usize,
    italic: usize,
}

impl Parser {
    fn new() -> Self {
        Self {
            blocks: Vec::new(),
            spans: Vec::new(),
            kind: BlockKind::Paragraph,
            bold: 0,
            italic: 0,
        }
    }

    fn push_text(&mut self, raw: &str) {
        let text = normalize_whitespace(&unescape_entities(raw));
        if text.is_empty() {
            return;
        }
        // Bare whitespace between tags opens no span.
        if text.trim().is_empty() && self.spans.is_empty() {
            return;
        }
        let bold = self.bold > 0;
        let italic = self.italic > 0;
        if let Some(last) = self.spans.last_mut() {
            if last.bold == bold && last.italic == italic {
                last.text.push_str(&text);
                return;
            }
        }
        self.spans.push(Span { text, bold, italic });
    }

    fn flush(&mut self, next: BlockKind) {
        let spans = trim_spans(std::mem::take(&mut self.spans));
        if !spans.is_empty() {
            self.blocks.push(match self.kind {
                BlockKind::Paragraph => Block::Paragraph(spans),
                BlockKind::Bullet => Block::Bullet(spans),
            });
        }
        self.kind = next;
    }

    fn handle_tag(&mut self, tag: &str) {
        let inner = tag.trim_start_matches('<').trim_end_matches('>').trim();
        let (closing, rest) = match inner.strip_prefix('/') {
            Some(rest) => (true, rest),
            None => (false, inner),
        };
        let name: String = rest
            .chars()
            .take_while(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();

        match (name.as_str(), closing) {
            ("p", _) | ("br", _) | ("ul", _) | ("ol", _) => self.flush(BlockKind::Paragraph),
            ("li", false) => self.flush(BlockKind::Bullet),
            ("li", true) => self.flush(BlockKind::Paragraph),
            ("b", false) | ("strong", false) => self.bold += 1,
            ("b", true) | ("strong", true) => self.bold = self.bold.saturating_sub(1),
            ("i", false) | ("em", false) => self.italic += 1,
            ("i", true) | ("em", true) => self.italic = self.italic.saturating_sub(1),
            (h, false) if is_heading(h) => {
                self.flush(BlockKind::Paragraph);
                self.bold += 1;
            }
            (h, true) if is_heading(h) => {
                self.bold = self.bold.saturating_sub(1);
                self.flush(BlockKind::Paragraph);
            }
            // Unknown tags (div, span, a, ...) contribute nothing; their
            // text content still flows into the current block.
            _ => {}
        }
    }
}

fn is_heading(name: &str) -> bool {
    matches!(name, "h1" | "h2" | "h3" | "h4" | "h5" | "h6")
}

fn unescape_entities(text: &str) -> String {
    text.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

/// Collapse whitespace runs to single spaces, keeping boundary spaces so
/// words split across spans stay separated.
fn normalize_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_whitespace = false;
    for c in text.chars() {
        if c.is_whitespace() {
            if !in_whitespace {
                out.push(' ');
            }
            in_whitespace = true;
        } else {
            out.push(c);
            in_whitespace = false;
        }
    }
    out
}

fn trim_spans(mut spans: Vec<Span>) -> Vec<Span> {
    while let Some(first) = spans.first_mut() {
        let trimmed = first.text.trim_start();
        if trimmed.is_empty() {
            spans.remove(0);
            continue;
        }
        if trimmed.len() != first.text.len() {
            first.text = trimmed.to_string();
        }
        break;
    }
    while let Some(last) = spans.last_mut() {
        let trimmed = last.text.trim_end();
        if trimmed.is_empty() {
            spans.pop();
            continue;
        }
        if trimmed.len() != last.text.len() {
            last.text = trimmed.to_string();
        }
        break;
    }
    spans
}

#[cfg(test)]
mod tests {
    use super::*;

    fn para(blocks: &[Block], index: usize) -> &[Span] {
        match &blocks[index] {
            Block::Paragraph(spans) => spans,
            Block::Bullet(spans) => spans,
        }
    }

    #[test]
    fn test_paragraph_with_bold() {
        let blocks = parse_blocks("<p>Hello <b>world</b></p>");
        assert_eq!(blocks.len(), 1);
        let spans = para(&blocks, 0);
        assert_eq!(spans.len(), 2);
        assert_eq!(spans[0].text, "Hello ");
        assert!(!spans[0].bold);
        assert_eq!(spans[1].text, "world");
        assert!(spans[1].bold);
    }

    #[test]
    fn test_bullet_list() {
        let blocks = parse_blocks("<ul><li>One</li><li>Two <i>emphasized</i></li></ul>");
        assert_eq!(blocks.len(), 2);
        assert!(matches!(blocks[0], Block::Bullet(_)));
        assert!(matches!(blocks[1], Block::Bullet(_)));
        let spans = para(&blocks, 1);
        assert_eq!(spans[0].text, "Two ");
        assert!(spans[1].italic);
    }

    #[test]
    fn test_entities_unescaped() {
        let blocks = parse_blocks("<p>profit &amp; loss &lt;5%&gt;</p>");
        assert_eq!(para(&blocks, 0)[0].text, "profit & loss <5%>");
    }

    #[test]
    fn test_tagless_text_is_one_paragraph() {
        let blocks = parse_blocks("Just plain text with no markup.");
        assert_eq!(blocks.len(), 1);
        assert_eq!(para(&blocks, 0)[0].text, "Just plain text with no markup.");
    }

    #[test]
    fn test_heading_becomes_bold_paragraph() {
        let blocks = parse_blocks("<h2>Key findings</h2><p>Body.</p>");
        assert_eq!(blocks.len(), 2);
        let heading = para(&blocks, 0);
        assert_eq!(heading[0].text, "Key findings");
        assert!(heading[0].bold);
        assert!(!para(&blocks, 1)[0].bold);
    }

    #[test]
    fn test_br_splits_paragraph() {
        let blocks = parse_blocks("<p>First line<br/>Second line</p>");
        assert_eq!(blocks.len(), 2);
        assert_eq!(para(&blocks, 0)[0].text, "First line");
        assert_eq!(para(&blocks, 1)[0].text, "Second line");
    }

    #[test]
    fn test_unknown_tags_are_dropped() {
        let blocks = parse_blocks(r#"<div class="summary"><p>Kept <a href="x">link text</a></p></div>"#);
        assert_eq!(blocks.len(), 1);
        let spans = para(&blocks, 0);
        assert_eq!(spans[0].text, "Kept link text");
    }

    #[test]
    fn test_whitespace_between_tags_ignored() {
        let blocks = parse_blocks("<ul>\n  <li>Only item</li>\n</ul>");
        assert_eq!(blocks.len(), 1);
        assert_eq!(para(&blocks, 0)[0].text, "Only item");
    }

    #[test]
    fn test_empty_input() {
        assert!(parse_blocks("").is_empty());
        assert!(parse_blocks("  \n ").is_empty());
        assert!(parse_blocks("<p></p><ul></ul>").is_empty());
    }

    #[test]
    fn test_nested_bold_italic() {
        let blocks = parse_blocks("<p><b>bold <i>both</i></b></p>");
        let spans = para(&blocks, 0);
        assert_eq!(spans.len(), 2);
        assert!(spans[0].bold && !spans[0].italic);
        assert!(spans[1].bold && spans[1].italic);
    }
}
