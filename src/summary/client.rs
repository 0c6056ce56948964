//! Chat API client for the OpenAI-compatible NIM endpoint.

use crate::config::SummarySettings;
use crate::error::{ReferatError, Result};
use async_openai::config::OpenAIConfig;
use async_openai::types::{
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
};
use async_openai::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

/// Environment variable holding the API key.
pub const API_KEY_VAR: &str = "NVIDIA_API_KEY";

/// Default timeout for chat API requests (5 minutes).
const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// Check if the NVIDIA API key is configured.
pub fn is_api_key_configured() -> bool {
    std::env::var(API_KEY_VAR)
        .map(|v| !v.trim().is_empty())
        .unwrap_or(false)
}

/// Chat client bound to one endpoint, model, and temperature.
pub struct ChatClient {
    client: Client<OpenAIConfig>,
    model: String,
    temperature: f32,
}

impl ChatClient {
    /// Create a client for the configured endpoint.
    ///
    /// The API key comes from the environment only; it is never written to
    /// the config file.
    pub fn from_settings(settings: &SummarySettings, model_override: Option<&str>) -> Result<Self> {
        let api_key = std::env::var(API_KEY_VAR)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| {
                ReferatError::Config(format!("{API_KEY_VAR} not set in .env or environment"))
            })?;

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .expect("Failed to create HTTP client");

        let config = OpenAIConfig::new()
            .with_api_base(settings.api_base.clone())
            .with_api_key(api_key);

        Ok(Self {
            client: Client::with_config(config).with_http_client(http_client),
            model: model_override.unwrap_or(&settings.model).to_string(),
            temperature: settings.temperature,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// One chat completion round-trip, returning the raw assistant text.
    pub async fn complete(&self, system: &str, user: &str) -> Result<String> {
        let messages: Vec<ChatCompletionRequestMessage> = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(system.to_string())
                .build()
                .map_err(|e| ReferatError::ChatApi(e.to_string()))?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(user.to_string())
                .build()
                .map_err(|e| ReferatError::ChatApi(e.to_string()))?
                .into(),
        ];

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .temperature(self.temperature)
            .build()
            .map_err(|e| ReferatError::ChatApi(e.to_string()))?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| ReferatError::ChatApi(format!("chat completion failed: {e}")))?;

        let content = response
            .choices
            .first()
            .and_then(|c| c.message.content.as_ref())
            .ok_or_else(|| ReferatError::ChatApi("Empty response from model".to_string()))?
            .clone();

        debug!("Model returned {} characters", content.len());
        Ok(content)
    }

    /// Chat completion whose answer must parse as a JSON object of type `T`.
    pub async fn complete_json<T: DeserializeOwned>(&self, system: &str, user: &str) -> Result<T> {
        let raw = self.complete(system, user).await?;
        parse_json_response(&raw)
    }
}

/// Parse a JSON object out of a model response that may wrap it in markdown
/// fences or surrounding prose.
pub fn parse_json_response<T: DeserializeOwned>(response: &str) -> Result<T> {
    let json_start = response.find('{');
    let json_end = response.rfind('}');

    let json_str = match (json_start, json_end) {
        (Some(start), Some(end)) if end > start => &response[start..=end],
        _ => response,
    };

    serde_json::from_str(json_str).map_err(|e| {
        ReferatError::Summarization(format!(
            "Failed to parse model response: {}. Response was: {}",
            e,
            truncate_chars(response, 500)
        ))
    })
}

fn truncate_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::summary::{TopicExtraction, TopicSummary};

    #[test]
    fn test_parse_bare_json() {
        let parsed: TopicExtraction =
            parse_json_response(r#"{"topics": ["Intro", "GDPR scope"]}"#).unwrap();
        assert_eq!(parsed.topics, vec!["Intro", "GDPR scope"]);
    }

    #[test]
    fn test_parse_fenced_json() {
        let response = "```json\n{\"topics\": [\"Data subjects\"]}\n```";
        let parsed: TopicExtraction = parse_json_response(response).unwrap();
        assert_eq!(parsed.topics, vec!["Data subjects"]);
    }

    #[test]
    fn test_parse_json_with_prose_around_it() {
        let response = "Sure, here is the result:\n{\"topic\": \"Consent\", \"summary\": \"Needs to be freely given.\"}\nLet me know if you need more.";
        let parsed: TopicSummary = parse_json_response(response).unwrap();
        assert_eq!(parsed.topic, "Consent");
        assert!(parsed.summary.contains("freely given"));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        let result: crate::error::Result<TopicExtraction> =
            parse_json_response("the model refused to answer");
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_error_truncates_multibyte_safely() {
        let response = "å".repeat(600);
        let result: crate::error::Result<TopicExtraction> = parse_json_response(&response);
        let err = result.unwrap_err().to_string();
        assert!(err.contains("Failed to parse model response"));
    }

    #[test]
    fn test_api_key_check_does_not_panic() {
        let _ = is_api_key_configured();
    }
}
