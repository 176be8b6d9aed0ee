//! Reqwest-backed Anthropic Messages API client implementing `InsightModel`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::domain::ports::{InsightModel, InsightModelError, InsightPrompt};
use crate::outbound::http_body::body_preview;

pub const DEFAULT_ANTHROPIC_BASE_URL: &str = "https://api.anthropic.com";
pub const DEFAULT_ANTHROPIC_MODEL: &str = "claude-sonnet-4-20250514";
pub const DEFAULT_MAX_TOKENS: u32 = 2000;
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Model selection and endpoint for [`AnthropicInsightModel`].
#[derive(Debug, Clone)]
pub struct AnthropicConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub max_tokens: u32,
}

impl AnthropicConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_ANTHROPIC_BASE_URL.to_owned(),
            model: DEFAULT_ANTHROPIC_MODEL.to_owned(),
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }
}

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: [UserMessage<'a>; 1],
}

#[derive(Debug, Serialize)]
struct UserMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

/// Language model client for insight drafting.
pub struct AnthropicInsightModel {
    client: Client,
    config: AnthropicConfig,
}

impl AnthropicInsightModel {
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(config: AnthropicConfig, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, config })
    }
}

fn joined_text(response: MessagesResponse) -> Result<String, InsightModelError> {
    let text: String = response
        .content
        .into_iter()
        .filter(|block| block.kind == "text")
        .filter_map(|block| block.text)
        .collect();
    if text.is_empty() {
        Err(InsightModelError::empty_response())
    } else {
        Ok(text)
    }
}

#[async_trait]
impl InsightModel for AnthropicInsightModel {
    async fn complete(&self, prompt: &InsightPrompt) -> Result<String, InsightModelError> {
        let request = MessagesRequest {
            model: &self.config.model,
            max_tokens: self.config.max_tokens,
            system: &prompt.system,
            messages: [UserMessage {
                role: "user",
                content: &prompt.user,
            }],
        };
        let url = format!("{}/v1/messages", self.config.base_url.trim_end_matches('/'));
        let response = self
            .client
            .post(url)
            .header("x-api-key", self.config.api_key.as_str())
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&request)
            .send()
            .await
            .map_err(|err| InsightModelError::transport(err.to_string()))?;
        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|err| InsightModelError::transport(err.to_string()))?;
        if !status.is_success() {
            return Err(InsightModelError::status(status.as_u16(), body_preview(&body)));
        }
        let decoded: MessagesResponse = serde_json::from_slice(&body)
            .map_err(|err| InsightModelError::transport(format!("invalid response: {err}")))?;
        joined_text(decoded)
    }
}
