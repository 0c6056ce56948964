//! Transcribe command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::media::MediaInput;
use crate::pipeline::Pipeline;
use crate::transcription::format_timestamp;
use anyhow::Result;

/// Run the transcribe command.
pub async fn run_transcribe(video: &str, model: Option<String>, settings: Settings) -> Result<()> {
    let input = MediaInput::detect(video)?;

    if let Err(e) = preflight::check(Operation::Transcribe {
        remote: input.is_remote(),
    }) {
        Output::error(&format!("{}", e));
        Output::info("Run 'referat doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    Output::info(&format!("Starting transcription for: {}", video));

    let pipeline = Pipeline::new(settings)?;
    let outcome = match pipeline.transcribe_media(video, model.as_deref()).await {
        Ok(outcome) => outcome,
        Err(e) => {
            Output::error(&format!("Transcription failed: {}", e));
            return Err(e.into());
        }
    };

    if let Some(duration) = outcome.duration_seconds {
        Output::kv("Duration", &format_timestamp(duration));
    }
    Output::success(&format!(
        "Done. Transcript at: {}",
        outcome.transcript_path.display()
    ));

    Ok(())
}
