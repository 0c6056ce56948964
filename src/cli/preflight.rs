//! Pre-flight checks before expensive operations.
//!
//! Validates that required tools and configuration are available
//! before starting operations that would otherwise fail midway. In
//! particular, the full pipeline checks the chat API key up front so a
//! missing key cannot waste a long transcription run.

use crate::error::{ReferatError, Result};
use crate::summary;
use std::process::Command;

/// Requirements for different operations.
#[derive(Debug, Clone, Copy)]
pub enum Operation {
    /// Transcription needs ffmpeg/ffprobe, plus yt-dlp for remote media.
    Transcribe { remote: bool },
    /// Summarization needs the chat API key.
    Summarize,
    /// The full pipeline needs both.
    FullPipeline { remote: bool },
}

/// Run pre-flight checks for the given operation.
///
/// Returns Ok(()) if all checks pass, or an error describing what's missing.
pub fn check(operation: Operation) -> Result<()> {
    match operation {
        Operation::Transcribe { remote } => {
            check_tools(remote)?;
        }
        Operation::Summarize => {
            check_api_key()?;
        }
        Operation::FullPipeline { remote } => {
            check_tools(remote)?;
            check_api_key()?;
        }
    }
    Ok(())
}

fn check_tools(remote: bool) -> Result<()> {
    check_tool("ffmpeg")?;
    check_tool("ffprobe")?;
    if remote {
        check_tool("yt-dlp")?;
    }
    Ok(())
}

/// Check if the chat API key is configured.
fn check_api_key() -> Result<()> {
    if summary::is_api_key_configured() {
        Ok(())
    } else {
        Err(ReferatError::Config(format!(
            "{key} not set. Set it in .env or with: export {key}='nvapi-...'",
            key = summary::API_KEY_VAR
        )))
    }
}

/// Check if an external tool is available.
fn check_tool(name: &str) -> Result<()> {
    // ffmpeg/ffprobe use -version (single dash), others use --version
    let version_arg = match name {
        "ffmpeg" | "ffprobe" => "-version",
        _ => "--version",
    };
    match Command::new(name).arg(version_arg).output() {
        Ok(output) if output.status.success() => Ok(()),
        Ok(_) => Err(ReferatError::ToolFailed(format!(
            "{} is installed but not working correctly",
            name
        ))),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(ReferatError::ToolNotFound(name.to_string()))
        }
        Err(e) => Err(ReferatError::ToolFailed(format!("{}: {}", name, e))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_tool_is_reported_by_name() {
        let err = check_tool("definitely-not-a-real-tool-48151").unwrap_err();
        assert!(err.to_string().contains("definitely-not-a-real-tool-48151"));
    }
}
