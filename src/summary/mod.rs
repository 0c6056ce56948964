//! Topic extraction and summarization.
//!
//! Drives the chat model through three sequential passes over the chunked
//! transcript: find the topics each chunk covers, build one accumulated
//! summary per topic, then format each summary as simple HTML for the PDF.
//! Calls run one at a time; the NIM endpoint rate-limits aggressively.

mod client;
mod digest;
mod format;
mod topics;

pub use client::{is_api_key_configured, parse_json_response, ChatClient, API_KEY_VAR};
pub use digest::{SummaryReport, TopicSummarizer};
pub use format::HtmlFormatter;
pub use topics::{ChunkTopics, TopicExtractor, TopicMap};

use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};

/// Structured payload expected from the topic extraction pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopicExtraction {
    pub topics: Vec<String>,
}

/// Structured payload expected from the summarization pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopicSummary {
    pub topic: String,
    pub summary: String,
}

/// Progress bar for one pass. Labels are padded to nine columns so the
/// bars of consecutive passes line up.
pub(crate) fn stage_bar(len: u64, label: &str) -> ProgressBar {
    let pb = ProgressBar::new(len);
    pb.set_style(
        ProgressStyle::default_bar()
            .template(&format!(
                "  {{spinner:.green}} {label:<9} [{{bar:30.cyan/blue}}] {{pos}}/{{len}}"
            ))
            .unwrap()
            .progress_chars("█▓░"),
    );
    pb
}
