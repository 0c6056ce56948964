//! Media input handling.
//!
//! Classifies the `--video` argument as a remote URL or a local file and
//! derives the slug that names every downstream artifact.

use crate::error::{ReferatError, Result};
use std::path::{Path, PathBuf};
use url::Url;

/// Where the media comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaInput {
    /// A remote http(s) URL, fetched with yt-dlp.
    Remote { url: String },
    /// An existing local audio or video file.
    Local { path: PathBuf },
}

impl MediaInput {
    /// Classify a raw input string.
    ///
    /// Anything that parses as an absolute http(s) URL is remote. Everything
    /// else is treated as a local path, which must point to an existing file.
    pub fn detect(input: &str) -> Result<Self> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(ReferatError::InvalidInput("empty media input".to_string()));
        }

        if let Ok(parsed) = Url::parse(trimmed) {
            return match parsed.scheme() {
                "http" | "https" => Ok(MediaInput::Remote {
                    url: trimmed.to_string(),
                }),
                scheme => Err(ReferatError::MediaInput(format!(
                    "Unsupported URL scheme: {scheme}"
                ))),
            };
        }

        let path = PathBuf::from(trimmed);
        if path.is_file() {
            Ok(MediaInput::Local { path })
        } else {
            Err(ReferatError::MediaInput(format!(
                "File not found: {}",
                path.display()
            )))
        }
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, MediaInput::Remote { .. })
    }

    /// Human-readable form for log lines.
    pub fn describe(&self) -> String {
        match self {
            MediaInput::Remote { url } => format!("URL {url}"),
            MediaInput::Local { path } => format!("local file {}", path.display()),
        }
    }
}

/// Turn a media title into a file-name slug.
///
/// Whitespace and path-hostile characters become underscores. Consecutive
/// replacements are kept as-is so the slug stays reversible for display
/// (underscores turn back into spaces in the PDF title).
pub fn slugify(title: &str) -> String {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return "audio".to_string();
    }

    trimmed
        .chars()
        .map(|c| {
            if c.is_whitespace() || matches!(c, '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|') {
                '_'
            } else {
                c
            }
        })
        .collect()
}

/// File stem of a local media path, for slug derivation.
pub fn file_stem(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("audio")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_detect_http_url() {
        let input = MediaInput::detect("https://www.youtube.com/watch?v=dQw4w9WgXcQ").unwrap();
        assert!(input.is_remote());

        let input = MediaInput::detect("http://example.com/talk.mp4").unwrap();
        assert!(input.is_remote());
    }

    #[test]
    fn test_detect_rejects_other_schemes() {
        let err = MediaInput::detect("ftp://example.com/talk.mp4").unwrap_err();
        assert!(err.to_string().contains("Unsupported URL scheme"));
    }

    #[test]
    fn test_detect_existing_local_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"stub").unwrap();

        let input = MediaInput::detect(file.path().to_str().unwrap()).unwrap();
        assert!(!input.is_remote());
        match input {
            MediaInput::Local { path } => assert_eq!(path, file.path()),
            other => panic!("expected local input, got {other:?}"),
        }
    }

    #[test]
    fn test_detect_missing_local_file() {
        let err = MediaInput::detect("/nonexistent/lecture.mp4").unwrap_err();
        assert!(err.to_string().contains("File not found"));
    }

    #[test]
    fn test_detect_empty_input() {
        assert!(MediaInput::detect("   ").is_err());
    }

    #[test]
    fn test_slugify_whitespace() {
        assert_eq!(slugify("Intro to GDPR"), "Intro_to_GDPR");
        assert_eq!(slugify("  padded title "), "padded_title");
        assert_eq!(slugify("tab\tseparated"), "tab_separated");
        // Runs are preserved, not collapsed
        assert_eq!(slugify("double  space"), "double__space");
    }

    #[test]
    fn test_slugify_hostile_characters() {
        assert_eq!(slugify("AC/DC: Live"), "AC_DC__Live");
        assert_eq!(slugify("what?\"quote\""), "what__quote_");
    }

    #[test]
    fn test_slugify_empty_falls_back() {
        assert_eq!(slugify(""), "audio");
        assert_eq!(slugify("   "), "audio");
    }

    #[test]
    fn test_file_stem() {
        assert_eq!(file_stem(Path::new("/tmp/My Lecture.mp4")), "My Lecture");
        assert_eq!(file_stem(Path::new("talk.webm")), "talk");
    }
}
