//! Whisper model catalog and download.
//!
//! Models come from the ggml conversions published by the whisper.cpp
//! project. Downloads go to a temporary file first and are renamed into
//! place, so an interrupted download never leaves a truncated model behind.

use crate::error::{ReferatError, Result};
use futures::StreamExt;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, instrument};

const MODEL_BASE_URL: &str = "https://huggingface.co/ggerganov/whisper.cpp/resolve/main";

/// Known whisper models with a rough size note for display.
pub const MODEL_CATALOG: &[(&str, &str)] = &[
    ("tiny", "~75 MB - fastest, lower quality"),
    ("tiny.en", "~75 MB - fastest, English only"),
    ("base", "~142 MB - fast, decent quality"),
    ("base.en", "~142 MB - fast, English only"),
    ("small", "~466 MB - balanced"),
    ("small.en", "~466 MB - balanced, English only"),
    ("medium", "~1.5 GB - better quality, slower"),
    ("medium.en", "~1.5 GB - better quality, English only"),
    ("large-v2", "~2.9 GB - high quality"),
    ("large-v3", "~2.9 GB - best quality"),
    ("large-v3-turbo", "~1.6 GB - near large-v3 quality, faster"),
];

pub fn is_known_model(name: &str) -> bool {
    MODEL_CATALOG.iter().any(|(n, _)| *n == name)
}

/// Names of all known models, for error messages and help output.
pub fn available_models() -> Vec<&'static str> {
    MODEL_CATALOG.iter().map(|(n, _)| *n).collect()
}

/// Download URL for a model by name.
pub fn model_url(name: &str) -> Option<String> {
    is_known_model(name).then(|| format!("{MODEL_BASE_URL}/ggml-{name}.bin"))
}

/// On-disk path for a model file under the given directory.
pub fn model_file_path(dir: &Path, name: &str) -> PathBuf {
    dir.join(format!("ggml-{name}.bin"))
}

/// Language forced by English-only model variants.
pub fn default_language_for(name: &str) -> Option<&'static str> {
    name.ends_with(".en").then_some("en")
}

/// Ensure a model is available locally, downloading it if needed.
#[instrument(skip(dir))]
pub async fn ensure_model(name: &str, dir: &Path) -> Result<PathBuf> {
    let url = model_url(name).ok_or_else(|| {
        ReferatError::Config(format!(
            "Unknown whisper model '{}'. Available: {}",
            name,
            available_models().join(", ")
        ))
    })?;

    let path = model_file_path(dir, name);
    if path.is_file() {
        debug!("Using cached model at {}", path.display());
        return Ok(path);
    }

    std::fs::create_dir_all(dir)?;
    info!("Downloading whisper model {} from {}", name, url);

    let response = reqwest::get(&url)
        .await?
        .error_for_status()
        .map_err(|e| ReferatError::ModelDownload(format!("{name}: {e}")))?;

    let pb = match response.content_length() {
        Some(total) => {
            let pb = ProgressBar::new(total);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("  {spinner:.green} Model     [{bar:30.cyan/blue}] {bytes}/{total_bytes}")
                    .unwrap()
                    .progress_chars("█▓░"),
            );
            pb
        }
        None => ProgressBar::new_spinner(),
    };

    let temp_path = path.with_extension("bin.tmp");
    let mut file = tokio::fs::File::create(&temp_path).await?;

    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let chunk =
            chunk.map_err(|e| ReferatError::ModelDownload(format!("{name}: download interrupted: {e}")))?;
        file.write_all(&chunk).await?;
        pb.inc(chunk.len() as u64);
    }
    file.flush().await?;
    drop(file);

    tokio::fs::rename(&temp_path, &path).await?;
    pb.finish_and_clear();

    info!("Model saved to {}", path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_models() {
        assert!(is_known_model("base.en"));
        assert!(is_known_model("large-v3-turbo"));
        assert!(!is_known_model("base.no"));
        assert!(!is_known_model(""));
    }

    #[test]
    fn test_model_url() {
        assert_eq!(
            model_url("base.en").unwrap(),
            "https://huggingface.co/ggerganov/whisper.cpp/resolve/main/ggml-base.en.bin"
        );
        assert!(model_url("nonsense").is_none());
    }

    #[test]
    fn test_model_file_path() {
        let path = model_file_path(Path::new("/models"), "small");
        assert_eq!(path, PathBuf::from("/models/ggml-small.bin"));
    }

    #[test]
    fn test_default_language() {
        assert_eq!(default_language_for("base.en"), Some("en"));
        assert_eq!(default_language_for("tiny.en"), Some("en"));
        assert_eq!(default_language_for("large-v3"), None);
    }

    #[tokio::test]
    async fn test_ensure_model_rejects_unknown() {
        let dir = tempfile::tempdir().unwrap();
        let err = ensure_model("no-such-model", dir.path()).await.unwrap_err();
        assert!(err.to_string().contains("Unknown whisper model"));
    }

    #[tokio::test]
    async fn test_ensure_model_uses_cached_file() {
        let dir = tempfile::tempdir().unwrap();
        let cached = model_file_path(dir.path(), "base.en");
        std::fs::write(&cached, b"stub model").unwrap();

        let path = ensure_model("base.en", dir.path()).await.unwrap();
        assert_eq!(path, cached);
    }
}
