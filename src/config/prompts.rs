//! Prompt templates for Referat.
//!
//! Prompts can be customized by placing TOML files in the custom prompts directory.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Collection of all prompt templates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Prompts {
    pub topics: TopicPrompts,
    pub summary: SummaryPrompts,
    pub format: FormatPrompts,
    /// Custom variables from config, available in all prompts.
    #[serde(skip)]
    pub variables: std::collections::HashMap<String, String>,
}


/// Prompts for per-chunk topic extraction.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TopicPrompts {
    pub system: String,
    pub user: String,
}

impl Default for TopicPrompts {
    fn default() -> Self {
        Self {
            system: r#"You are a transcript analyst acting as a topic extractor.

Given a chunk of a lecture or conversation transcript, identify logical transitions and divide the text into sections based on:
- Topic changes
- Speaker changes
- Q&A transitions
- Clear shifts in focus or structure

For each section provide a short heading or title, one sentence at most. Do not include summaries or explanations, only section titles.

Ignore irrelevant or non-substantive content such as:
- Breaks (e.g., "Short break", "Let's resume")
- Technical issues (e.g., "Mic not working")
- Administrative notes (e.g., "Assignment deadline")
- Filler or small talk

Respond with only a JSON object in this exact format:
{"topics": ["First topic title", "Second topic title"]}"#
                .to_string(),

            user: r#"Transcript chunk:
"""
{{chunk}}
"""

Return only the JSON response."#
                .to_string(),
        }
    }
}

/// Prompts for per-topic summarization.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SummaryPrompts {
    pub system: String,
    pub user: String,
}

impl Default for SummaryPrompts {
    fn default() -> Self {
        Self {
            system: r#"You are an expert in summarizing educational transcripts.

Your task is to write a clear and detailed summary for a single topic from a transcript chunk:
- Focus ONLY on the requested topic
- Preserve the speaker's structure and flow
- Include examples, case studies, laws, or Q&A in the summary if the chunk explicitly mentions them
- Do NOT summarize other unrelated topics
- If a previous summary is provided, consolidate the new information into it without duplicating content

Respond with only a JSON object in this exact format:
{"topic": "The topic title", "summary": "The summary text"}"#
                .to_string(),

            user: r#"Topic to summarize: "{{topic}}"

Other topics in this chunk (ignore these): {{other_topics}}

Previous summary content (if any):
{{previous_summary}}

Transcript chunk:
"""
{{chunk}}
"""

Return only the JSON response."#
                .to_string(),
        }
    }
}

/// Prompts for HTML formatting of finished summaries.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FormatPrompts {
    pub system: String,
    pub user: String,
}

impl Default for FormatPrompts {
    fn default() -> Self {
        Self {
            system: r#"You are formatting an educational transcript summary for PDF export.

Use clean, simple HTML formatting:
- <p> for paragraphs
- <ul><li>...</li></ul> for bullet points if present
- <b> and <i> for emphasis where it genuinely helps readability
- Do NOT include any introductory phrases like "Here is the formatted HTML"

Do not include CSS or extra styling. Respond with the HTML only."#
                .to_string(),

            user: r#"Format the following content as structured HTML:

"""
{{summary}}
""""#
                .to_string(),
        }
    }
}

impl Prompts {
    /// Load prompts from the default location, with optional custom directory and variables.
    pub fn load(
        custom_dir: Option<&str>,
        custom_variables: Option<&std::collections::HashMap<String, String>>,
    ) -> crate::error::Result<Self> {
        let mut prompts = Prompts::default();

        // Store custom variables
        if let Some(vars) = custom_variables {
            prompts.variables = vars.clone();
        }

        if let Some(dir) = custom_dir {
            let custom_path = PathBuf::from(shellexpand::tilde(dir).to_string());

            // Load topic extraction prompts if file exists
            let topics_path = custom_path.join("topics.toml");
            if topics_path.exists() {
                let content = std::fs::read_to_string(&topics_path)?;
                prompts.topics = toml::from_str(&content)?;
            }

            // Load summarization prompts if file exists
            let summary_path = custom_path.join("summary.toml");
            if summary_path.exists() {
                let content = std::fs::read_to_string(&summary_path)?;
                prompts.summary = toml::from_str(&content)?;
            }

            // Load formatting prompts if file exists
            let format_path = custom_path.join("format.toml");
            if format_path.exists() {
                let content = std::fs::read_to_string(&format_path)?;
                prompts.format = toml::from_str(&content)?;
            }
        }

        Ok(prompts)
    }

    /// Render a prompt template with the given variables.
    pub fn render(template: &str, vars: &std::collections::HashMap<String, String>) -> String {
        let mut result = template.to_string();
        for (key, value) in vars {
            result = result.replace(&format!("{{{{{}}}}}", key), value);
        }
        result
    }

    /// Render a prompt template with both provided variables and custom config variables.
    /// Provided variables take precedence over custom config variables.
    pub fn render_with_custom(
        &self,
        template: &str,
        vars: &std::collections::HashMap<String, String>,
    ) -> String {
        // Start with custom variables, then override with provided vars
        let mut merged = self.variables.clone();
        for (key, value) in vars {
            merged.insert(key.clone(), value.clone());
        }
        Self::render(template, &merged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_prompts() {
        let prompts = Prompts::default();
        assert!(!prompts.topics.system.is_empty());
        assert!(!prompts.summary.system.is_empty());
        assert!(!prompts.format.system.is_empty());
        assert!(prompts.topics.user.contains("{{chunk}}"));
        assert!(prompts.summary.user.contains("{{topic}}"));
        assert!(prompts.format.user.contains("{{summary}}"));
    }

    #[test]
    fn test_render_template() {
        let template = "Hello {{name}}, you have {{count}} messages.";
        let mut vars = std::collections::HashMap::new();
        vars.insert("name".to_string(), "Alice".to_string());
        vars.insert("count".to_string(), "5".to_string());

        let result = Prompts::render(template, &vars);
        assert_eq!(result, "Hello Alice, you have 5 messages.");
    }

    #[test]
    fn test_custom_dir_overrides_section() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("topics.toml"),
            r#"
            system = "Custom topic system prompt"
            user = "Custom user prompt: {{chunk}}"
            "#,
        )
        .unwrap();

        let prompts = Prompts::load(dir.path().to_str(), None).unwrap();
        assert_eq!(prompts.topics.system, "Custom topic system prompt");
        // Untouched sections keep their defaults
        assert!(prompts.summary.system.contains("educational transcripts"));
    }
}
