//! Pipeline stages wiring media input through to the PDF.
//!
//! The two stages are independent so the CLI can run either on its own:
//! transcription turns any supported media into a transcript text file, and
//! summarization turns a transcript text file into the JSON report and PDF.

use crate::audio;
use crate::chunking::TextSplitter;
use crate::config::{Prompts, Settings};
use crate::error::{ReferatError, Result};
use crate::media::{self, MediaInput};
use crate::pdf::SummaryPdf;
use crate::summary::{ChatClient, HtmlFormatter, TopicExtractor, TopicSummarizer};
use crate::transcription::{self, Transcriber, WhisperTranscriber};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, instrument, warn};

/// Artifacts produced by the transcription stage.
#[derive(Debug)]
pub struct TranscribeOutcome {
    pub slug: String,
    pub audio_path: PathBuf,
    pub transcript_path: PathBuf,
    pub duration_seconds: Option<f64>,
}

/// Artifacts produced by the summarization stage.
#[derive(Debug)]
pub struct SummaryOutcome {
    pub json_path: PathBuf,
    pub pdf_path: PathBuf,
    pub topic_count: usize,
    pub page_count: usize,
}

/// Shared state for pipeline runs.
pub struct Pipeline {
    settings: Settings,
    prompts: Prompts,
}

impl Pipeline {
    pub fn new(settings: Settings) -> Result<Self> {
        let prompts = Prompts::load(
            settings.prompts.custom_dir.as_deref(),
            Some(&settings.prompts.variables),
        )?;
        Ok(Self { settings, prompts })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Turn a media input (URL or local file) into a transcript text file.
    ///
    /// The slug naming every artifact comes from the media title for URLs
    /// and from the file stem for local files.
    #[instrument(skip(self, input))]
    pub async fn transcribe_media(
        &self,
        input: &str,
        model_override: Option<&str>,
    ) -> Result<TranscribeOutcome> {
        let input = MediaInput::detect(input)?;
        info!("Transcribing {}", input.describe());

        let audio_dir = self.settings.audio_dir();
        let (slug, wav_path) = match &input {
            MediaInput::Remote { url } => {
                eprintln!("  Fetching metadata...");
                let title = audio::fetch_title(url).await?;
                eprintln!("  Title: {}", title);
                let slug = media::slugify(&title);
                eprintln!("  Downloading audio...");
                let wav = audio::download_audio(url, &slug, &audio_dir).await?;
                eprintln!("  Audio downloaded.");
                (slug, wav)
            }
            MediaInput::Local { path } => {
                let slug = media::slugify(&media::file_stem(path));
                let wav = audio_dir.join(format!("{slug}.wav"));
                eprintln!("  Extracting audio...");
                audio::convert_to_wav(path, &wav).await?;
                (slug, wav)
            }
        };

        let mut duration_seconds = match audio::probe_duration(&wav_path).await {
            Ok(seconds) => Some(seconds),
            Err(e) => {
                warn!("Could not probe audio duration: {e}");
                None
            }
        };

        let model = model_override.unwrap_or(&self.settings.transcription.model);
        let model_path = transcription::ensure_model(model, &self.settings.model_dir()).await?;

        let language = self
            .settings
            .transcription
            .language
            .clone()
            .or_else(|| transcription::default_language_for(model).map(str::to_string));

        info!("Transcribing audio...");
        eprintln!("  Transcribing with {}...", model);
        let transcriber =
            WhisperTranscriber::new(model_path, language, self.settings.transcription.threads);
        let transcript = transcriber.transcribe(&wav_path).await?;
        eprintln!(
            "  Transcription complete ({} segments)",
            transcript.segments.len()
        );
        if transcript.is_empty() {
            return Err(ReferatError::Transcription(
                "transcription produced no text".to_string(),
            ));
        }
        if duration_seconds.is_none() && transcript.duration_seconds > 0.0 {
            duration_seconds = Some(transcript.duration_seconds);
        }

        let transcript_dir = self.settings.transcript_dir();
        std::fs::create_dir_all(&transcript_dir)?;
        let transcript_path = transcript_dir.join(format!("{slug}_transcript.txt"));
        std::fs::write(&transcript_path, transcript.full_text.trim())?;
        info!("Transcript written to {}", transcript_path.display());

        Ok(TranscribeOutcome {
            slug,
            audio_path: wav_path,
            transcript_path,
            duration_seconds,
        })
    }

    /// Turn a transcript text file into the topic JSON report and the PDF.
    #[instrument(skip(self), fields(transcript = %transcript_path.display()))]
    pub async fn summarize_transcript(
        &self,
        transcript_path: &Path,
        model_override: Option<&str>,
    ) -> Result<SummaryOutcome> {
        let text = std::fs::read_to_string(transcript_path)?;
        if text.trim().is_empty() {
            return Err(ReferatError::Summarization(format!(
                "Transcript is empty: {}",
                transcript_path.display()
            )));
        }

        info!("Chunking transcript...");
        eprintln!("  Chunking transcript...");
        let splitter = TextSplitter::from_settings(&self.settings.chunking)?;
        let chunks = splitter.split(&text);
        if chunks.is_empty() {
            return Err(ReferatError::Summarization(
                "Transcript produced no chunks".to_string(),
            ));
        }
        eprintln!("  Created {} chunks", chunks.len());

        let client = ChatClient::from_settings(&self.settings.summary, model_override)?;

        info!("Extracting topics with {}", client.model());
        eprintln!("  Extracting topics...");
        let extractor = TopicExtractor::new(&client, &self.prompts);
        let topic_map = extractor.extract(&chunks).await?;
        eprintln!("  Found {} topics", topic_map.known_topics().len());

        info!("Summarizing {} topics", topic_map.known_topics().len());
        eprintln!("  Summarizing topics...");
        let summarizer = TopicSummarizer::new(&client, &self.prompts);
        let report = summarizer.summarize(&chunks, &topic_map).await?;
        if report.is_empty() {
            return Err(ReferatError::Summarization(
                "No topic could be summarized".to_string(),
            ));
        }

        let summary_dir = self.settings.summary_dir();
        std::fs::create_dir_all(&summary_dir)?;

        let json_path = summary_dir.join("topic_summaries.json");
        std::fs::write(&json_path, report.to_json_pretty()?)?;
        info!("Topic summaries written to {}", json_path.display());

        info!("Formatting summaries as HTML...");
        eprintln!("  Formatting summaries...");
        let formatter = HtmlFormatter::new(
            &client,
            &self.prompts,
            Duration::from_millis(self.settings.summary.rate_limit_ms),
        );
        let formatted = formatter.format_report(&report).await;

        eprintln!("  Rendering PDF...");
        let stem = media::file_stem(transcript_path);
        let title = stem.replace('_', " ");
        let mut pdf = SummaryPdf::new(&title)?;
        for (topic, html) in &formatted {
            pdf.add_topic(topic, html);
        }
        let page_count = pdf.page_count();
        let pdf_path = summary_dir.join(format!("{stem}_summary.pdf"));
        pdf.save(&pdf_path)?;
        info!("PDF written to {}", pdf_path.display());

        Ok(SummaryOutcome {
            json_path,
            pdf_path,
            topic_count: report.len(),
            page_count,
        })
    }
}
