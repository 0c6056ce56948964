//! Third pass: render each topic summary as simple HTML for the PDF.

use crate::config::Prompts;
use crate::summary::digest::SummaryReport;
use crate::summary::{stage_bar, ChatClient};
use std::collections::HashMap;
use std::time::Duration;
use tokio::time::sleep;
use tracing::warn;

/// Formats summaries into HTML, one model call per topic.
pub struct HtmlFormatter<'a> {
    client: &'a ChatClient,
    prompts: &'a Prompts,
    pause: Duration,
}

impl<'a> HtmlFormatter<'a> {
    pub fn new(client: &'a ChatClient, prompts: &'a Prompts, pause: Duration) -> Self {
        Self {
            client,
            prompts,
            pause,
        }
    }

    /// Format every topic in report order. This pass never fails: a topic
    /// whose formatting call errors falls back to its plain summary wrapped
    /// in an escaped paragraph.
    pub async fn format_report(&self, report: &SummaryReport) -> Vec<(String, String)> {
        let pb = stage_bar(report.len() as u64, "Format");

        let mut formatted = Vec::with_capacity(report.len());
        for (topic, summary) in report.iter() {
            // The endpoint rate-limits bursts; pause before every call.
            sleep(self.pause).await;

            let mut vars = HashMap::new();
            vars.insert("summary".to_string(), summary.to_string());
            let user = self
                .prompts
                .render_with_custom(&self.prompts.format.user, &vars);

            let html = match self
                .client
                .complete(&self.prompts.format.system, &user)
                .await
            {
                Ok(response) => {
                    let stripped = strip_code_fences(&response);
                    if stripped.is_empty() {
                        warn!("Empty HTML for topic '{topic}', using plain fallback");
                        fallback_html(summary)
                    } else {
                        stripped
                    }
                }
                Err(e) => {
                    warn!("HTML formatting failed for topic '{topic}': {e}");
                    fallback_html(summary)
                }
            };
            formatted.push((topic.to_string(), html));
            pb.inc(1);
        }
        pb.finish_and_clear();
        formatted
    }
}

fn fallback_html(summary: &str) -> String {
    format!("<p>{}</p>", escape_html(summary))
}

/// Remove a surrounding markdown code fence, with or without a language tag.
fn strip_code_fences(text: &str) -> String {
    let trimmed = text.trim();
    if !trimmed.starts_with("```") {
        return trimmed.to_string();
    }
    let inner = match trimmed.find('\n') {
        Some(pos) => &trimmed[pos + 1..],
        None => return trimmed.trim_matches('`').trim().to_string(),
    };
    let inner = inner.trim_end().strip_suffix("```").unwrap_or(inner);
    inner.trim().to_string()
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_fence_with_language() {
        let input = "```html\n<p>Hello</p>\n```";
        assert_eq!(strip_code_fences(input), "<p>Hello</p>");
    }

    #[test]
    fn test_strip_bare_fence() {
        let input = "```\n<ul><li>One</li></ul>\n```";
        assert_eq!(strip_code_fences(input), "<ul><li>One</li></ul>");
    }

    #[test]
    fn test_unfenced_passes_through() {
        assert_eq!(
            strip_code_fences("  <p>already clean</p>\n"),
            "<p>already clean</p>"
        );
    }

    #[test]
    fn test_escape_html_entities() {
        assert_eq!(
            escape_html(r#"profit & loss < 5% "net""#),
            "profit &amp; loss &lt; 5% &quot;net&quot;"
        );
    }

    #[test]
    fn test_fallback_wraps_and_escapes() {
        assert_eq!(
            fallback_html("a < b & c"),
            "<p>a &lt; b &amp; c</p>"
        );
    }
}
