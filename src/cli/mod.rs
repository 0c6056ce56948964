//! CLI module for Referat.

pub mod commands;
mod output;
pub mod preflight;

pub use output::Output;

use clap::{Parser, Subcommand};

/// Referat - Lecture and Talk Summarizer
///
/// A local-first CLI that turns spoken-word media into a structured PDF
/// summary. "Referat" is the word used in German and the Scandinavian
/// languages for a written summary of a talk.
#[derive(Parser, Debug)]
#[command(name = "referat")]
#[command(version, about, long_about = None)]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// Increase verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Transcribe media and summarize the transcript into a PDF
    FullPipeline {
        /// YouTube URL or local audio/video file path
        #[arg(short, long)]
        video: String,

        /// Whisper model to transcribe with (e.g. tiny, base.en, small)
        #[arg(short, long)]
        model: Option<String>,
    },

    /// Transcribe media into a transcript text file
    Transcribe {
        /// YouTube URL or local audio/video file path
        #[arg(short, long)]
        video: String,

        /// Whisper model to transcribe with (e.g. tiny, base.en, small)
        #[arg(short, long)]
        model: Option<String>,
    },

    /// Summarize an existing transcript into a PDF
    Summarize {
        /// Path to a transcript text file
        #[arg(short, long)]
        transcript: String,

        /// Chat model for topic extraction and summarization
        #[arg(short, long)]
        model: Option<String>,
    },

    /// Check system requirements and configuration
    Doctor,
}
