//! Local whisper.cpp transcription implementation.

use super::{Transcriber, Transcript, TranscriptSegment};
use crate::audio;
use crate::error::{ReferatError, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};
use whisper_rs::{FullParams, SamplingStrategy, WhisperContext, WhisperContextParameters};

/// whisper.cpp-based transcriber running fully offline.
pub struct WhisperTranscriber {
    model_path: PathBuf,
    language: Option<String>,
    threads: Option<usize>,
}

impl WhisperTranscriber {
    pub fn new(model_path: PathBuf, language: Option<String>, threads: Option<usize>) -> Self {
        Self {
            model_path,
            language,
            threads,
        }
    }
}

#[async_trait]
impl Transcriber for WhisperTranscriber {
    #[instrument(skip(self), fields(audio_path = %audio_path.display()))]
    async fn transcribe(&self, audio_path: &Path) -> Result<Transcript> {
        let slug = audio_path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("audio")
            .to_string();

        let samples = audio::read_mono_f32(audio_path)?;
        if samples.is_empty() {
            return Err(ReferatError::Transcription(
                "audio file contains no samples".to_string(),
            ));
        }
        debug!("Loaded {} samples", samples.len());

        let model_path = self.model_path.clone();
        let language = self.language.clone();
        let threads = self.threads;

        // whisper.cpp decoding is CPU-bound; keep it off the async runtime
        let segments = tokio::task::spawn_blocking(move || {
            run_whisper(&model_path, &samples, language.as_deref(), threads)
        })
        .await
        .map_err(|e| ReferatError::Transcription(format!("transcription task failed: {e}")))??;

        info!("Transcribed {} segments", segments.len());
        Ok(Transcript::new(slug, segments))
    }
}

/// Blocking whisper.cpp invocation.
///
/// Loads the model, decodes the full sample buffer with greedy sampling and
/// collects per-segment text with centisecond timestamps.
fn run_whisper(
    model_path: &Path,
    samples: &[f32],
    language: Option<&str>,
    threads: Option<usize>,
) -> Result<Vec<TranscriptSegment>> {
    // Route whisper.cpp's C-side logging into tracing instead of stderr
    whisper_rs::install_logging_hooks();

    let model_str = model_path.to_str().ok_or_else(|| {
        ReferatError::Transcription(format!(
            "model path is not valid UTF-8: {}",
            model_path.display()
        ))
    })?;

    let ctx = WhisperContext::new_with_params(model_str, WhisperContextParameters::default())
        .map_err(|e| {
            ReferatError::Transcription(format!("failed to load model {model_str}: {e}"))
        })?;

    let mut state = ctx
        .create_state()
        .map_err(|e| ReferatError::Transcription(format!("failed to create state: {e}")))?;

    let mut params = FullParams::new(SamplingStrategy::Greedy { best_of: 1 });
    params.set_print_special(false);
    params.set_print_progress(false);
    params.set_print_realtime(false);
    params.set_print_timestamps(false);
    params.set_translate(false);
    if let Some(lang) = language {
        params.set_language(Some(lang));
    }
    if let Some(n) = threads {
        params.set_n_threads(n as std::os::raw::c_int);
    }

    state
        .full(params, samples)
        .map_err(|e| ReferatError::Transcription(format!("decode failed: {e}")))?;

    let num_segments = state
        .full_n_segments()
        .map_err(|e| ReferatError::Transcription(format!("failed to read segment count: {e}")))?;

    let mut segments = Vec::with_capacity(num_segments as usize);
    for i in 0..num_segments {
        let text = state
            .full_get_segment_text(i)
            .map_err(|e| ReferatError::Transcription(format!("failed to read segment {i}: {e}")))?;
        let t0 = state
            .full_get_segment_t0(i)
            .map_err(|e| ReferatError::Transcription(format!("failed to read segment {i}: {e}")))?;
        let t1 = state
            .full_get_segment_t1(i)
            .map_err(|e| ReferatError::Transcription(format!("failed to read segment {i}: {e}")))?;

        // Timestamps arrive as centisecond ticks
        segments.push(TranscriptSegment::new(
            t0 as f64 / 100.0,
            t1 as f64 / 100.0,
            text.trim().to_string(),
        ));
    }

    Ok(segments)
}
