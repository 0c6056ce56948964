//! First pass: topic extraction over transcript chunks.

use crate::config::Prompts;
use crate::error::{ReferatError, Result};
use crate::summary::{stage_bar, ChatClient, TopicExtraction};
use std::collections::HashMap;
use tracing::{debug, warn};

/// Topics the model found in one transcript chunk.
#[derive(Debug, Clone)]
pub struct ChunkTopics {
    pub chunk_index: usize,
    pub topics: Vec<String>,
}

/// Per-chunk topic lists plus the ordered union of all topics seen so far.
///
/// Order matters: the final report lists topics in first-seen order, so the
/// union is kept as a Vec rather than a set.
#[derive(Debug, Default)]
pub struct TopicMap {
    pub per_chunk: Vec<ChunkTopics>,
    known_topics: Vec<String>,
}

impl TopicMap {
    pub fn record(&mut self, chunk_index: usize, topics: Vec<String>) {
        for topic in &topics {
            if !self.known_topics.iter().any(|t| t == topic) {
                self.known_topics.push(topic.clone());
            }
        }
        self.per_chunk.push(ChunkTopics {
            chunk_index,
            topics,
        });
    }

    pub fn known_topics(&self) -> &[String] {
        &self.known_topics
    }

    pub fn is_empty(&self) -> bool {
        self.per_chunk.is_empty()
    }
}

/// Runs the topic-extraction prompt against every chunk in order.
pub struct TopicExtractor<'a> {
    client: &'a ChatClient,
    prompts: &'a Prompts,
}

impl<'a> TopicExtractor<'a> {
    pub fn new(client: &'a ChatClient, prompts: &'a Prompts) -> Self {
        Self { client, prompts }
    }

    /// Extract topics for each chunk. Chunks whose extraction fails are
    /// skipped; if every chunk fails, the whole pass fails.
    pub async fn extract(&self, chunks: &[String]) -> Result<TopicMap> {
        let pb = stage_bar(chunks.len() as u64, "Topics");

        let mut map = TopicMap::default();
        for (index, chunk) in chunks.iter().enumerate() {
            let mut vars = HashMap::new();
            vars.insert("chunk".to_string(), chunk.clone());
            let user = self
                .prompts
                .render_with_custom(&self.prompts.topics.user, &vars);

            match self
                .client
                .complete_json::<TopicExtraction>(&self.prompts.topics.system, &user)
                .await
            {
                Ok(extraction) => {
                    let topics: Vec<String> = extraction
                        .topics
                        .into_iter()
                        .map(|t| t.trim().to_string())
                        .filter(|t| !t.is_empty())
                        .collect();
                    debug!("Chunk {index}: {} topics", topics.len());
                    map.record(index, topics);
                }
                Err(e) => {
                    warn!("Topic extraction failed for chunk {index}: {e}");
                }
            }
            pb.inc(1);
        }
        pb.finish_and_clear();

        if map.is_empty() {
            return Err(ReferatError::Summarization(
                "Topic extraction failed for every chunk".to_string(),
            ));
        }
        Ok(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_dedups_known_topics_in_order() {
        let mut map = TopicMap::default();
        map.record(0, vec!["Intro".to_string(), "Scope".to_string()]);
        map.record(1, vec!["Scope".to_string(), "Penalties".to_string()]);

        assert_eq!(map.known_topics(), &["Intro", "Scope", "Penalties"]);
        assert_eq!(map.per_chunk.len(), 2);
        assert_eq!(map.per_chunk[1].chunk_index, 1);
        assert_eq!(map.per_chunk[1].topics, vec!["Scope", "Penalties"]);
    }

    #[test]
    fn test_empty_map() {
        let map = TopicMap::default();
        assert!(map.is_empty());
        assert!(map.known_topics().is_empty());
    }

    #[test]
    fn test_record_keeps_empty_topic_lists() {
        // A chunk with no topics still counts as successfully processed.
        let mut map = TopicMap::default();
        map.record(0, vec![]);
        assert!(!map.is_empty());
        assert!(map.known_topics().is_empty());
    }
}
