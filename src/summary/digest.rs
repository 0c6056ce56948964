//! Second pass: per-topic summaries that accumulate across chunks.

use crate::config::Prompts;
use crate::error::Result;
use crate::summary::topics::TopicMap;
use crate::summary::{stage_bar, ChatClient, TopicSummary};
use std::collections::HashMap;
use tracing::{debug, warn};

/// Accumulated summaries keyed by topic, in first-seen order.
#[derive(Debug, Default)]
pub struct SummaryReport {
    sections: Vec<(String, String)>,
}

impl SummaryReport {
    /// Append text under a topic, opening a new section if the topic is new.
    /// Later additions to the same topic are separated by a newline.
    pub fn append(&mut self, topic: &str, summary: &str) {
        if let Some((_, existing)) = self.sections.iter_mut().find(|(t, _)| t == topic) {
            existing.push('\n');
            existing.push_str(summary);
        } else {
            self.sections.push((topic.to_string(), summary.to_string()));
        }
    }

    pub fn get(&self, topic: &str) -> Option<&str> {
        self.sections
            .iter()
            .find(|(t, _)| t == topic)
            .map(|(_, s)| s.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.sections.iter().map(|(t, s)| (t.as_str(), s.as_str()))
    }

    /// Serialize as a pretty-printed JSON object, topics in report order.
    pub fn to_json_pretty(&self) -> Result<String> {
        let mut map = serde_json::Map::new();
        for (topic, summary) in &self.sections {
            map.insert(topic.clone(), serde_json::Value::String(summary.clone()));
        }
        Ok(serde_json::to_string_pretty(&serde_json::Value::Object(
            map,
        ))?)
    }
}

/// Runs the summarization prompt once per (chunk, topic) pair.
pub struct TopicSummarizer<'a> {
    client: &'a ChatClient,
    prompts: &'a Prompts,
}

impl<'a> TopicSummarizer<'a> {
    pub fn new(client: &'a ChatClient, prompts: &'a Prompts) -> Self {
        Self { client, prompts }
    }

    /// Summarize each chunk under each of its topics, feeding the summary
    /// accumulated so far back into later calls for the same topic.
    pub async fn summarize(
        &self,
        chunks: &[String],
        topic_map: &TopicMap,
    ) -> Result<SummaryReport> {
        let total: u64 = topic_map
            .per_chunk
            .iter()
            .map(|c| c.topics.len() as u64)
            .sum();
        let pb = stage_bar(total, "Summaries");

        let mut report = SummaryReport::default();
        for chunk_topics in &topic_map.per_chunk {
            let chunk = match chunks.get(chunk_topics.chunk_index) {
                Some(chunk) => chunk,
                None => {
                    warn!(
                        "Chunk index {} out of range, skipping",
                        chunk_topics.chunk_index
                    );
                    continue;
                }
            };

            for topic in &chunk_topics.topics {
                let others: Vec<&str> = chunk_topics
                    .topics
                    .iter()
                    .filter(|t| *t != topic)
                    .map(String::as_str)
                    .collect();
                let other_topics = if others.is_empty() {
                    "(none)".to_string()
                } else {
                    others.join(", ")
                };
                let previous = report.get(topic).unwrap_or("(none)").to_string();

                let mut vars = HashMap::new();
                vars.insert("topic".to_string(), topic.clone());
                vars.insert("other_topics".to_string(), other_topics);
                vars.insert("previous_summary".to_string(), previous);
                vars.insert("chunk".to_string(), chunk.clone());
                let user = self
                    .prompts
                    .render_with_custom(&self.prompts.summary.user, &vars);

                match self
                    .client
                    .complete_json::<TopicSummary>(&self.prompts.summary.system, &user)
                    .await
                {
                    Ok(parsed) => {
                        let text = parsed.summary.trim();
                        if text.is_empty() {
                            warn!(
                                "Empty summary for topic '{topic}' in chunk {}",
                                chunk_topics.chunk_index
                            );
                        } else {
                            // Keyed by the topic we asked for, not the one the
                            // model echoes back; models paraphrase headings.
                            report.append(topic, text);
                        }
                    }
                    Err(e) => {
                        warn!(
                            "Summarization failed for topic '{topic}' in chunk {}: {e}",
                            chunk_topics.chunk_index
                        );
                    }
                }
                pb.inc(1);
            }
        }
        pb.finish_and_clear();

        debug!("Report holds {} topics", report.len());
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_accumulates_with_newline() {
        let mut report = SummaryReport::default();
        report.append("Consent", "First part.");
        report.append("Consent", "Second part.");

        assert_eq!(report.len(), 1);
        assert_eq!(report.get("Consent"), Some("First part.\nSecond part."));
    }

    #[test]
    fn test_topics_keep_first_seen_order() {
        let mut report = SummaryReport::default();
        report.append("Zebra", "z");
        report.append("Apple", "a");
        report.append("Zebra", "zz");

        let topics: Vec<&str> = report.iter().map(|(t, _)| t).collect();
        assert_eq!(topics, vec!["Zebra", "Apple"]);
    }

    #[test]
    fn test_get_missing_topic() {
        let report = SummaryReport::default();
        assert!(report.is_empty());
        assert_eq!(report.get("anything"), None);
    }

    #[test]
    fn test_json_preserves_report_order() {
        let mut report = SummaryReport::default();
        report.append("Second half", "later");
        report.append("Administrative", "earlier in alphabet, later in report");

        let json = report.to_json_pretty().unwrap();
        let second = json.find("Second half").unwrap();
        let admin = json.find("Administrative").unwrap();
        assert!(second < admin);

        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed["Second half"], "later");
    }
}
