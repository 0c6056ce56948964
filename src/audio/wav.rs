//! WAV loading for transcription.

use crate::error::{ReferatError, Result};
use std::path::Path;

/// Sample rate whisper models are trained on.
pub const SAMPLE_RATE: u32 = 16_000;

/// Reads a 16 kHz mono 16-bit WAV into normalized f32 samples.
///
/// The extraction stage always produces this exact format; anything else
/// means the file did not come out of our ffmpeg invocation.
pub fn read_mono_f32(path: &Path) -> Result<Vec<f32>> {
    let reader = hound::WavReader::open(path).map_err(|e| {
        ReferatError::Transcription(format!("cannot open WAV {}: {e}", path.display()))
    })?;

    let spec = reader.spec();
    if spec.channels != 1 {
        return Err(ReferatError::Transcription(format!(
            "expected mono audio, got {} channels",
            spec.channels
        )));
    }
    if spec.sample_rate != SAMPLE_RATE {
        return Err(ReferatError::Transcription(format!(
            "expected {SAMPLE_RATE} Hz audio, got {} Hz",
            spec.sample_rate
        )));
    }
    if spec.sample_format != hound::SampleFormat::Int || spec.bits_per_sample != 16 {
        return Err(ReferatError::Transcription(format!(
            "expected 16-bit integer samples, got {}-bit {:?}",
            spec.bits_per_sample, spec.sample_format
        )));
    }

    let samples: std::result::Result<Vec<i16>, _> = reader.into_samples::<i16>().collect();
    let samples =
        samples.map_err(|e| ReferatError::Transcription(format!("corrupt WAV data: {e}")))?;

    Ok(samples.into_iter().map(|s| s as f32 / 32768.0).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_wav(path: &Path, channels: u16, sample_rate: u32, samples: &[i16]) {
        let spec = hound::WavSpec {
            channels,
            sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(path, spec).unwrap();
        for s in samples {
            writer.write_sample(*s).unwrap();
        }
        writer.finalize().unwrap();
    }

    #[test]
    fn test_reads_valid_wav() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ok.wav");
        write_wav(&path, 1, SAMPLE_RATE, &[0, 16384, -16384, 32767]);

        let samples = read_mono_f32(&path).unwrap();
        assert_eq!(samples.len(), 4);
        assert!((samples[0] - 0.0).abs() < 1e-6);
        assert!((samples[1] - 0.5).abs() < 1e-6);
        assert!((samples[2] + 0.5).abs() < 1e-6);
        assert!(samples[3] < 1.0);
    }

    #[test]
    fn test_rejects_stereo() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stereo.wav");
        write_wav(&path, 2, SAMPLE_RATE, &[0, 0, 1, 1]);

        let err = read_mono_f32(&path).unwrap_err();
        assert!(err.to_string().contains("mono"));
    }

    #[test]
    fn test_rejects_wrong_sample_rate() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("44k.wav");
        write_wav(&path, 1, 44_100, &[0, 1, 2]);

        let err = read_mono_f32(&path).unwrap_err();
        assert!(err.to_string().contains("16000 Hz"));
    }

    #[test]
    fn test_missing_file() {
        assert!(read_mono_f32(Path::new("/nonexistent/audio.wav")).is_err());
    }
}
