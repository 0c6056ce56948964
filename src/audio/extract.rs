//! Audio extraction utilities.
//!
//! This module provides functions for downloading audio from URLs using yt-dlp
//! and converting media files to whisper-ready WAV using ffmpeg.

use crate::error::{ReferatError, Result};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, info, instrument};

/// Fetches the media title for a URL using yt-dlp metadata extraction.
///
/// Falls back to "audio" when the metadata carries no title.
#[instrument]
pub async fn fetch_title(url: &str) -> Result<String> {
    let result = Command::new("yt-dlp")
        .arg("--dump-json")
        .arg("--no-download")
        .arg("--no-playlist")
        .arg("--no-warnings")
        .arg(url)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await;

    let output = match result {
        Ok(o) => o,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(ReferatError::ToolNotFound("yt-dlp".into()));
        }
        Err(e) => {
            return Err(ReferatError::MediaInput(format!(
                "yt-dlp execution failed: {e}"
            )));
        }
    };

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(ReferatError::MediaInput(format!(
            "Could not fetch metadata for {url}: {stderr}"
        )));
    }

    let json_str = String::from_utf8_lossy(&output.stdout);
    let json: serde_json::Value = serde_json::from_str(json_str.trim())
        .map_err(|e| ReferatError::MediaInput(format!("Failed to parse yt-dlp output: {e}")))?;

    Ok(json["title"].as_str().unwrap_or("audio").to_string())
}

/// Downloads audio from a URL and converts it to a 16 kHz mono WAV.
///
/// yt-dlp fetches the best available audio stream in its native container;
/// ffmpeg then resamples it into `{slug}.wav` under `output_dir`. Existing
/// artifacts are overwritten.
#[instrument(skip(output_dir), fields(slug = %slug))]
pub async fn download_audio(url: &str, slug: &str, output_dir: &Path) -> Result<PathBuf> {
    std::fs::create_dir_all(output_dir)?;

    info!("Downloading audio from {}", url);

    let template = output_dir.join(format!("{slug}.%(ext)s"));

    let result = Command::new("yt-dlp")
        .arg("--format").arg("bestaudio/best")
        .arg("--output").arg(template.to_str().unwrap_or_default())
        .arg("--no-playlist")
        .arg("--quiet")
        .arg("--no-warnings")
        .arg(url)
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .output()
        .await;

    let output = match result {
        Ok(o) => o,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(ReferatError::ToolNotFound("yt-dlp".into()));
        }
        Err(e) => {
            return Err(ReferatError::AudioExtraction(format!(
                "yt-dlp execution failed: {e}"
            )));
        }
    };

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(ReferatError::AudioExtraction(format!("yt-dlp failed: {stderr}")));
    }

    let downloaded = find_downloaded_file(output_dir, slug)?;
    let wav_path = output_dir.join(format!("{slug}.wav"));

    // A rare bestaudio stream may already be WAV; move it aside so ffmpeg
    // never reads and writes the same file.
    let source = if downloaded == wav_path {
        let moved = output_dir.join(format!("{slug}.orig.wav"));
        std::fs::rename(&downloaded, &moved)?;
        moved
    } else {
        downloaded
    };

    convert_to_wav(&source, &wav_path).await?;
    let _ = std::fs::remove_file(&source);

    Ok(wav_path)
}

/// Locates a downloaded audio file by slug.
fn find_downloaded_file(dir: &Path, slug: &str) -> Result<PathBuf> {
    // Common audio formats that yt-dlp may produce
    for ext in &["m4a", "webm", "opus", "mp3", "ogg", "aac", "wav"] {
        let candidate = dir.join(format!("{}.{}", slug, ext));
        if candidate.exists() {
            return Ok(candidate);
        }
    }

    // Fallback: scan directory for matching prefix
    let entries = std::fs::read_dir(dir)
        .map_err(|e| ReferatError::AudioExtraction(format!("Cannot read directory: {e}")))?;

    for entry in entries.flatten() {
        let name = entry.file_name();
        let name = name.to_string_lossy();
        if name.starts_with(slug) && !name.ends_with(".part") {
            return Ok(entry.path());
        }
    }

    Err(ReferatError::AudioExtraction(
        "Audio file not found after download".into(),
    ))
}

/// Converts a media file to a 16 kHz mono signed-16-bit WAV using ffmpeg.
///
/// Video streams are stripped. The destination is overwritten if present.
pub async fn convert_to_wav(source: &Path, dest: &Path) -> Result<PathBuf> {
    if let Some(parent) = dest.parent() {
        std::fs::create_dir_all(parent)?;
    }

    debug!("Converting {:?} to 16 kHz mono WAV", source);

    let result = Command::new("ffmpeg")
        .arg("-y")
        .arg("-i").arg(source)
        .arg("-vn")
        .arg("-acodec").arg("pcm_s16le")
        .arg("-ar").arg("16000")
        .arg("-ac").arg("1")
        .arg("-loglevel").arg("error")
        .arg(dest)
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .output()
        .await;

    match result {
        Ok(out) if out.status.success() => Ok(dest.to_path_buf()),
        Ok(out) => {
            let err = String::from_utf8_lossy(&out.stderr);
            Err(ReferatError::AudioExtraction(format!(
                "ffmpeg conversion failed: {err}"
            )))
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(ReferatError::ToolNotFound("ffmpeg".into()))
        }
        Err(e) => Err(ReferatError::AudioExtraction(format!("ffmpeg error: {e}"))),
    }
}

/// Queries the duration of a media file using ffprobe with JSON output.
pub async fn probe_duration(path: &Path) -> Result<f64> {
    let result = Command::new("ffprobe")
        .arg("-v").arg("quiet")
        .arg("-print_format").arg("json")
        .arg("-show_format")
        .arg(path)
        .output()
        .await;

    let output = match result {
        Ok(o) => o,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(ReferatError::ToolNotFound("ffprobe".into()));
        }
        Err(e) => {
            return Err(ReferatError::AudioExtraction(format!("ffprobe failed: {e}")));
        }
    };

    if !output.status.success() {
        return Err(ReferatError::AudioExtraction("ffprobe returned error".into()));
    }

    // Parse JSON output to extract duration
    let json_str = String::from_utf8_lossy(&output.stdout);
    let parsed: serde_json::Value = serde_json::from_str(&json_str)
        .map_err(|_| ReferatError::AudioExtraction("Invalid ffprobe output".into()))?;

    parsed["format"]["duration"]
        .as_str()
        .and_then(|s| s.parse::<f64>().ok())
        .ok_or_else(|| ReferatError::AudioExtraction("Could not determine media duration".into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_downloaded_file_known_extension() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("Lecture_1.m4a"), b"stub").unwrap();

        let found = find_downloaded_file(dir.path(), "Lecture_1").unwrap();
        assert_eq!(found, dir.path().join("Lecture_1.m4a"));
    }

    #[test]
    fn test_find_downloaded_file_prefix_fallback() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("Lecture_2.mka"), b"stub").unwrap();

        let found = find_downloaded_file(dir.path(), "Lecture_2").unwrap();
        assert_eq!(found, dir.path().join("Lecture_2.mka"));
    }

    #[test]
    fn test_find_downloaded_file_skips_partial() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("Lecture_3.m4a.part"), b"stub").unwrap();

        assert!(find_downloaded_file(dir.path(), "Lecture_3").is_err());
    }

    #[test]
    fn test_find_downloaded_file_missing() {
        let dir = tempfile::tempdir().unwrap();
        assert!(find_downloaded_file(dir.path(), "nothing_here").is_err());
    }
}
