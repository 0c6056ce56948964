//! Full pipeline command - transcription followed by summarization.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::media::MediaInput;
use crate::pipeline::Pipeline;
use anyhow::Result;

/// Run both pipeline stages back to back.
///
/// `model` selects the whisper model; the chat model comes from the
/// configuration.
pub async fn run_full_pipeline(
    video: &str,
    model: Option<String>,
    settings: Settings,
) -> Result<()> {
    let input = MediaInput::detect(video)?;

    if let Err(e) = preflight::check(Operation::FullPipeline {
        remote: input.is_remote(),
    }) {
        Output::error(&format!("{}", e));
        Output::info("Run 'referat doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    let pipeline = Pipeline::new(settings)?;

    Output::info(&format!("Starting full pipeline for: {}", video));
    let transcribed = match pipeline.transcribe_media(video, model.as_deref()).await {
        Ok(outcome) => outcome,
        Err(e) => {
            Output::error(&format!("Transcription failed: {}", e));
            return Err(e.into());
        }
    };
    Output::success(&format!(
        "Transcript at: {}",
        transcribed.transcript_path.display()
    ));

    Output::info(&format!(
        "Starting summarization for: {}",
        transcribed.transcript_path.display()
    ));
    let summarized = match pipeline
        .summarize_transcript(&transcribed.transcript_path, None)
        .await
    {
        Ok(outcome) => outcome,
        Err(e) => {
            Output::error(&format!("Summarization failed: {}", e));
            return Err(e.into());
        }
    };

    Output::success(&format!(
        "Full pipeline complete. PDF at: {}",
        summarized.pdf_path.display()
    ));

    Ok(())
}
