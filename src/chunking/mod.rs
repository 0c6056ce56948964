//! Transcript chunking for summarization.
//!
//! Splits transcript text recursively on paragraph, line, and word
//! boundaries while measuring size in tokens, so each chunk fits the
//! summarization model's working window. Consecutive chunks share a token
//! overlap to keep context across the cut.

use crate::config::ChunkingSettings;
use crate::error::{ReferatError, Result};
use std::collections::VecDeque;
use tiktoken_rs::{cl100k_base, CoreBPE};
use tracing::warn;

/// Separators tried in order; the first one present in the text wins.
/// The empty separator splits into characters as a last resort.
const SEPARATORS: &[&str] = &["\n\n", "\n", " ", ""];

/// Token-budgeted recursive text splitter.
pub struct TextSplitter {
    bpe: CoreBPE,
    chunk_tokens: usize,
    overlap_tokens: usize,
}

impl TextSplitter {
    pub fn new(chunk_tokens: usize, overlap_tokens: usize) -> Result<Self> {
        if chunk_tokens == 0 {
            return Err(ReferatError::Chunking(
                "chunk_tokens must be positive".to_string(),
            ));
        }
        if overlap_tokens >= chunk_tokens {
            return Err(ReferatError::Chunking(format!(
                "overlap_tokens ({overlap_tokens}) must be smaller than chunk_tokens ({chunk_tokens})"
            )));
        }

        let bpe = cl100k_base()
            .map_err(|e| ReferatError::Chunking(format!("failed to load tokenizer: {e}")))?;

        Ok(Self {
            bpe,
            chunk_tokens,
            overlap_tokens,
        })
    }

    pub fn from_settings(settings: &ChunkingSettings) -> Result<Self> {
        Self::new(settings.chunk_tokens, settings.overlap_tokens)
    }

    /// Number of tokens the summarization model will see for this text.
    pub fn token_count(&self, text: &str) -> usize {
        self.bpe.encode_ordinary(text).len()
    }

    /// Split text into chunks of at most `chunk_tokens` tokens.
    ///
    /// Chunks are trimmed and never empty. A single run with no usable
    /// separator is split at character level rather than returned oversized.
    pub fn split(&self, text: &str) -> Vec<String> {
        if text.trim().is_empty() {
            return Vec::new();
        }
        self.split_recursive(text, SEPARATORS)
    }

    fn split_recursive(&self, text: &str, separators: &[&str]) -> Vec<String> {
        let mut final_chunks = Vec::new();

        // Pick the first separator present in the text; later separators
        // remain available for oversized pieces.
        let mut separator = *separators.last().unwrap_or(&"");
        let mut remaining: &[&str] = &[];
        for (i, sep) in separators.iter().enumerate() {
            if sep.is_empty() || text.contains(sep) {
                separator = sep;
                remaining = &separators[i + 1..];
                break;
            }
        }

        let splits = split_keeping_separator(text, separator);

        let mut good: Vec<String> = Vec::new();
        for piece in splits {
            if self.token_count(&piece) < self.chunk_tokens {
                good.push(piece);
            } else {
                if !good.is_empty() {
                    final_chunks.extend(self.merge_splits(&good));
                    good.clear();
                }
                if remaining.is_empty() {
                    final_chunks.push(piece);
                } else {
                    final_chunks.extend(self.split_recursive(&piece, remaining));
                }
            }
        }
        if !good.is_empty() {
            final_chunks.extend(self.merge_splits(&good));
        }

        final_chunks
    }

    /// Greedily pack splits into chunks, carrying a trailing window of at
    /// most `overlap_tokens` into the next chunk.
    fn merge_splits(&self, splits: &[String]) -> Vec<String> {
        let mut docs = Vec::new();
        let mut current: VecDeque<(&str, usize)> = VecDeque::new();
        let mut total = 0usize;

        for piece in splits {
            let len = self.token_count(piece);

            if total + len > self.chunk_tokens && !current.is_empty() {
                if total > self.chunk_tokens {
                    warn!(
                        "created a chunk of {} tokens, over the target of {}",
                        total, self.chunk_tokens
                    );
                }
                if let Some(doc) = join_pieces(current.iter().map(|(s, _)| *s)) {
                    docs.push(doc);
                }
                while total > self.overlap_tokens
                    || (total + len > self.chunk_tokens && total > 0)
                {
                    match current.pop_front() {
                        Some((_, l)) => total -= l,
                        None => break,
                    }
                }
            }

            current.push_back((piece.as_str(), len));
            total += len;
        }

        if let Some(doc) = join_pieces(current.iter().map(|(s, _)| *s)) {
            docs.push(doc);
        }

        docs
    }
}

/// Split on a separator, attaching each separator occurrence to the piece
/// that follows it so no text is lost when pieces are rejoined.
fn split_keeping_separator(text: &str, separator: &str) -> Vec<String> {
    if separator.is_empty() {
        return text.chars().map(|c| c.to_string()).collect();
    }

    let mut pieces = Vec::new();
    for (i, part) in text.split(separator).enumerate() {
        if i == 0 {
            if !part.is_empty() {
                pieces.push(part.to_string());
            }
        } else {
            let mut piece = String::with_capacity(separator.len() + part.len());
            piece.push_str(separator);
            piece.push_str(part);
            pieces.push(piece);
        }
    }
    pieces
}

fn join_pieces<'a>(pieces: impl Iterator<Item = &'a str>) -> Option<String> {
    let joined: String = pieces.collect();
    let trimmed = joined.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn splitter(chunk: usize, overlap: usize) -> TextSplitter {
        TextSplitter::new(chunk, overlap).unwrap()
    }

    #[test]
    fn test_rejects_bad_budgets() {
        assert!(TextSplitter::new(0, 0).is_err());
        assert!(TextSplitter::new(100, 100).is_err());
        assert!(TextSplitter::new(100, 200).is_err());
        assert!(TextSplitter::new(100, 99).is_ok());
    }

    #[test]
    fn test_empty_input() {
        let s = splitter(1000, 100);
        assert!(s.split("").is_empty());
        assert!(s.split("   \n\n  ").is_empty());
    }

    #[test]
    fn test_short_text_single_chunk() {
        let s = splitter(1000, 100);
        let chunks = s.split("  A short lecture excerpt.  ");
        assert_eq!(chunks, vec!["A short lecture excerpt."]);
    }

    #[test]
    fn test_paragraph_boundary_preferred() {
        let s = splitter(10, 0);
        let para = "one two three four five six seven";
        let text = format!("{para}\n\n{para}");

        let chunks = s.split(&text);
        assert_eq!(chunks, vec![para.to_string(), para.to_string()]);
    }

    #[test]
    fn test_overlap_carries_trailing_words() {
        let s = splitter(6, 2);
        let chunks = s.split("one two three four five six seven eight nine ten one two");

        assert_eq!(
            chunks,
            vec![
                "one two three four five six",
                "five six seven eight nine ten",
                "nine ten one two",
            ]
        );
    }

    #[test]
    fn test_budget_respected_for_word_separable_text() {
        let s = splitter(20, 5);
        let text = "the quick brown fox jumps over the lazy dog ".repeat(30);

        let chunks = s.split(&text);
        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(!chunk.trim().is_empty());
            assert!(s.token_count(chunk) <= 20, "oversized chunk: {chunk}");
        }
    }

    #[test]
    fn test_unbreakable_run_falls_back_to_characters() {
        let s = splitter(5, 0);
        let text = "x".repeat(400);

        let chunks = s.split(&text);
        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(s.token_count(chunk) <= 5);
        }
        let rejoined: String = chunks.concat();
        assert_eq!(rejoined, text);
    }

    #[test]
    fn test_split_keeping_separator_roundtrip() {
        let text = "a\n\nb\n\nc";
        let pieces = split_keeping_separator(text, "\n\n");
        assert_eq!(pieces, vec!["a", "\n\nb", "\n\nc"]);
        assert_eq!(pieces.concat(), text);
    }

    #[test]
    fn test_token_count_monotonic() {
        let s = splitter(1000, 100);
        let short = s.token_count("hello");
        let long = s.token_count("hello world, this is a longer sentence");
        assert!(short >= 1);
        assert!(long > short);
    }
}
