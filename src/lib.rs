//! Referat - Lecture and Talk Summarizer
//!
//! A local-first CLI that turns spoken-word media (local recordings or
//! YouTube URLs) into a structured PDF summary.
//!
//! "Referat" is the word used in German and the Scandinavian languages for
//! a written summary of a talk.
//!
//! # Overview
//!
//! Referat:
//! - Extracts 16 kHz mono audio from local media files or YouTube URLs
//! - Transcribes it locally with whisper.cpp (no audio leaves the machine)
//! - Splits the transcript into token-budgeted chunks
//! - Extracts topics and builds per-topic summaries with a chat model
//! - Renders the summaries into an A4 PDF with a topic-per-section layout
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - `config` - Configuration and prompt management
//! - `media` - Input classification and artifact naming
//! - `audio` - Audio download and WAV conversion
//! - `transcription` - Local whisper.cpp speech-to-text
//! - `chunking` - Token-based transcript splitting
//! - `summary` - Topic extraction, summarization, and HTML formatting
//! - `pdf` - PDF assembly
//! - `pipeline` - Stage coordination
//!
//! # Example
//!
//! ```rust,no_run
//! use referat::config::Settings;
//! use referat::pipeline::Pipeline;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let pipeline = Pipeline::new(settings)?;
//!
//!     let outcome = pipeline
//!         .transcribe_media("https://www.youtube.com/watch?v=jNQXAC9IVRw", None)
//!         .await?;
//!     println!("Transcript at {}", outcome.transcript_path.display());
//!
//!     Ok(())
//! }
//! ```

pub mod audio;
pub mod chunking;
pub mod cli;
pub mod config;
pub mod error;
pub mod media;
pub mod pdf;
pub mod pipeline;
pub mod summary;
pub mod transcription;

pub use error::{ReferatError, Result};
