//! Configuration module for Referat.
//!
//! Handles loading and managing application settings and prompt templates.

mod prompts;
mod settings;

pub use prompts::{FormatPrompts, Prompts, SummaryPrompts, TopicPrompts};
pub use settings::{
    ChunkingSettings, GeneralSettings, PromptSettings, Settings, SummarySettings,
    TranscriptionSettings,
};
