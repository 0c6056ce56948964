//! Audio acquisition and decoding.
//!
//! Turns any supported media input into a 16 kHz mono WAV via yt-dlp and
//! ffmpeg, and loads that WAV into the f32 sample buffer whisper expects.

mod extract;
mod wav;

pub use extract::{convert_to_wav, download_audio, fetch_title, probe_duration};
pub use wav::{read_mono_f32, SAMPLE_RATE};
