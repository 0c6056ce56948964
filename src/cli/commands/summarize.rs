//! Summarize command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::pipeline::Pipeline;
use anyhow::Result;
use std::path::Path;

/// Run the summarize command on an existing transcript file.
pub async fn run_summarize(
    transcript: &str,
    model: Option<String>,
    settings: Settings,
) -> Result<()> {
    if let Err(e) = preflight::check(Operation::Summarize) {
        Output::error(&format!("{}", e));
        Output::info("Run 'referat doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    let transcript_path = Path::new(transcript);
    if !transcript_path.is_file() {
        Output::error(&format!("Transcript not found: {}", transcript));
        return Err(anyhow::anyhow!("Transcript not found: {}", transcript));
    }

    Output::info(&format!("Starting summarization for: {}", transcript));

    let pipeline = Pipeline::new(settings)?;
    let outcome = match pipeline
        .summarize_transcript(transcript_path, model.as_deref())
        .await
    {
        Ok(outcome) => outcome,
        Err(e) => {
            Output::error(&format!("Summarization failed: {}", e));
            return Err(e.into());
        }
    };

    Output::kv("Topics", &outcome.topic_count.to_string());
    Output::kv("Report", &outcome.json_path.display().to_string());
    Output::success(&format!("Done. PDF at: {}", outcome.pdf_path.display()));

    Ok(())
}
