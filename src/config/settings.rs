//! Configuration settings for Referat.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub transcription: TranscriptionSettings,
    pub chunking: ChunkingSettings,
    pub summary: SummarySettings,
    pub prompts: PromptSettings,
}


/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Directory for pipeline artifacts, relative to the working directory
    /// unless absolute.
    pub data_dir: String,
    /// Log level used when no -v flag is given (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            data_dir: "data".to_string(),
            log_level: "warn".to_string(),
        }
    }
}

/// Speech-to-text settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranscriptionSettings {
    /// Whisper model name (e.g. tiny, base.en, small, large-v3).
    pub model: String,
    /// Directory holding downloaded ggml model files. None = platform default.
    pub model_dir: Option<String>,
    /// Spoken language hint (ISO 639-1). None = auto-detect, except for
    /// English-only models which always decode as "en".
    pub language: Option<String>,
    /// Decoder thread count. None = whisper default.
    pub threads: Option<usize>,
}

impl Default for TranscriptionSettings {
    fn default() -> Self {
        Self {
            model: "base.en".to_string(),
            model_dir: None,
            language: None,
            threads: None,
        }
    }
}

/// Transcript chunking settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingSettings {
    /// Target chunk size in tokens.
    pub chunk_tokens: usize,
    /// Token overlap carried between consecutive chunks.
    pub overlap_tokens: usize,
}

impl Default for ChunkingSettings {
    fn default() -> Self {
        Self {
            chunk_tokens: 1000,
            overlap_tokens: 100,
        }
    }
}

/// Summarization (chat API) settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SummarySettings {
    /// Chat model used for topic extraction and summarization.
    pub model: String,
    /// Base URL of the OpenAI-compatible endpoint.
    pub api_base: String,
    /// Sampling temperature for chat completions.
    pub temperature: f32,
    /// Pause between formatting calls, in milliseconds.
    pub rate_limit_ms: u64,
}

impl Default for SummarySettings {
    fn default() -> Self {
        Self {
            model: "meta/llama-3.1-405b-instruct".to_string(),
            api_base: "https://integrate.api.nvidia.com/v1".to_string(),
            temperature: 0.2,
            rate_limit_ms: 1000,
        }
    }
}

/// Prompt customization settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct PromptSettings {
    /// Directory for custom prompts (overrides defaults).
    pub custom_dir: Option<String>,
    /// Custom variables available in all prompts as {{variable_name}}.
    pub variables: std::collections::HashMap<String, String>,
}


impl Settings {
    /// Load settings from the default configuration file.
    pub fn load() -> crate::error::Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or default location if None.
    pub fn load_from(path: Option<&PathBuf>) -> crate::error::Result<Self> {
        let config_path = match path {
            Some(p) => p.clone(),
            None => Self::default_config_path(),
        };

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let settings: Settings = toml::from_str(&content)?;
            Ok(settings)
        } else {
            Ok(Settings::default())
        }
    }

    /// Save settings to the default configuration file.
    pub fn save(&self) -> crate::error::Result<()> {
        self.save_to(&Self::default_config_path())
    }

    /// Save settings to a specific path.
    pub fn save_to(&self, path: &PathBuf) -> crate::error::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::error::ReferatError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("referat")
            .join("config.toml")
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }

    /// Get the expanded data directory path.
    pub fn data_dir(&self) -> PathBuf {
        Self::expand_path(&self.general.data_dir)
    }

    /// Directory for extracted WAV audio.
    pub fn audio_dir(&self) -> PathBuf {
        self.data_dir().join("audio")
    }

    /// Directory for transcript text files.
    pub fn transcript_dir(&self) -> PathBuf {
        self.data_dir().join("transcripts")
    }

    /// Directory for summary artifacts (JSON and PDF).
    pub fn summary_dir(&self) -> PathBuf {
        self.data_dir().join("summary")
    }

    /// Directory holding downloaded whisper models.
    pub fn model_dir(&self) -> PathBuf {
        match &self.transcription.model_dir {
            Some(dir) => Self::expand_path(dir),
            None => dirs::data_local_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("referat")
                .join("models"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.general.data_dir, "data");
        assert_eq!(settings.transcription.model, "base.en");
        assert_eq!(settings.chunking.chunk_tokens, 1000);
        assert_eq!(settings.chunking.overlap_tokens, 100);
        assert_eq!(settings.summary.model, "meta/llama-3.1-405b-instruct");
        assert!(settings.summary.api_base.contains("nvidia.com"));
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let toml = r#"
            [transcription]
            model = "small"

            [summary]
            temperature = 0.5
        "#;
        let settings: Settings = toml::from_str(toml).unwrap();
        assert_eq!(settings.transcription.model, "small");
        assert_eq!(settings.summary.temperature, 0.5);
        assert_eq!(settings.general.data_dir, "data");
        assert_eq!(settings.chunking.chunk_tokens, 1000);
    }

    #[test]
    fn test_load_from_missing_path_uses_defaults() {
        let path = PathBuf::from("/nonexistent/referat/config.toml");
        let settings = Settings::load_from(Some(&path)).unwrap();
        assert_eq!(settings.transcription.model, "base.en");
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut settings = Settings::default();
        settings.transcription.model = "medium".to_string();
        settings.summary.rate_limit_ms = 250;
        settings.save_to(&path).unwrap();

        let reloaded = Settings::load_from(Some(&path)).unwrap();
        assert_eq!(reloaded.transcription.model, "medium");
        assert_eq!(reloaded.summary.rate_limit_ms, 250);
    }

    #[test]
    fn test_derived_dirs() {
        let mut settings = Settings::default();
        settings.general.data_dir = "/tmp/referat-test".to_string();
        assert_eq!(settings.audio_dir(), PathBuf::from("/tmp/referat-test/audio"));
        assert_eq!(
            settings.transcript_dir(),
            PathBuf::from("/tmp/referat-test/transcripts")
        );
        assert_eq!(
            settings.summary_dir(),
            PathBuf::from("/tmp/referat-test/summary")
        );
    }
}
