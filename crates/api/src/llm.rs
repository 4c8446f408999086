//! Text-generation client.
//!
//! Talks to an OpenAI-compatible chat completions endpoint (Groq by default).
//! Callers depend on [`TextGenerator`] so tests and alternative providers can
//! be swapped in.

use async_trait::async_trait;
use reframe_core::config::LlmConfig;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument};

use crate::{ApiError, ApiResult};

/// Requested shape of the generated text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Free text.
    Text,
    /// A single JSON object.
    Json,
}

/// One generation call.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub system: Option<String>,
    pub user: String,
    pub mode: OutputMode,
}

impl GenerationRequest {
    pub fn text(user: impl Into<String>) -> Self {
        Self {
            system: None,
            user: user.into(),
            mode: OutputMode::Text,
        }
    }

    pub fn json(system: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            system: Some(system.into()),
            user: user.into(),
            mode: OutputMode::Json,
        }
    }
}

/// External text-generation service.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Run one completion and return the model's text.
    async fn generate(&self, request: GenerationRequest) -> ApiResult<String>;
}

// ==================== Wire Types ====================

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

fn build_chat_request(model: &str, request: GenerationRequest) -> ChatCompletionRequest {
    let mut messages = Vec::with_capacity(2);
    if let Some(system) = request.system {
        messages.push(ChatMessage {
            role: "system",
            content: system,
        });
    }
    messages.push(ChatMessage {
        role: "user",
        content: request.user,
    });

    ChatCompletionRequest {
        model: model.to_string(),
        messages,
        response_format: match request.mode {
            OutputMode::Json => Some(ResponseFormat {
                kind: "json_object",
            }),
            OutputMode::Text => None,
        },
    }
}

// ==================== Groq Client ====================

/// Groq chat completions client.
pub struct GroqClient {
    client: reqwest::Client,
    api_key: String,
    model: String,
    endpoint: String,
}

impl GroqClient {
    pub fn new(api_key: &str, config: &LlmConfig) -> ApiResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            api_key: api_key.to_string(),
            model: config.model.clone(),
            endpoint: format!(
                "{}/chat/completions",
                config.base_url.trim_end_matches('/')
            ),
        })
    }
}

#[async_trait]
impl TextGenerator for GroqClient {
    #[instrument(skip_all, fields(model = %self.model, mode = ?request.mode))]
    async fn generate(&self, request: GenerationRequest) -> ApiResult<String> {
        let body = build_chat_request(&self.model, request);

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Upstream { status, body });
        }

        let completion: ChatCompletionResponse = response.json().await?;
        let content = completion
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| ApiError::InvalidResponse("no completion choices".to_string()))?;

        debug!("completion received ({} chars)", content.len());
        Ok(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_mode_sends_system_prompt_and_response_format() {
        let request = GenerationRequest::json("be kind", "you never listen");
        let body = serde_json::to_value(build_chat_request("llama", request)).unwrap();
        assert_eq!(
            body,
            serde_json::json!({
                "model": "llama",
                "messages": [
                    { "role": "system", "content": "be kind" },
                    { "role": "user", "content": "you never listen" },
                ],
                "response_format": { "type": "json_object" },
            })
        );
    }

    #[test]
    fn text_mode_omits_response_format() {
        let body =
            serde_json::to_value(build_chat_request("llama", GenerationRequest::text("idea")))
                .unwrap();
        assert!(body.get("response_format").is_none());
        assert_eq!(body["messages"].as_array().map(Vec::len), Some(1));
    }

    #[test]
    fn endpoint_joins_base_url() {
        let config = LlmConfig {
            base_url: "https://api.groq.com/openai/v1/".to_string(),
            ..LlmConfig::default()
        };
        let client = GroqClient::new("gsk_test", &config).unwrap();
        assert_eq!(
            client.endpoint,
            "https://api.groq.com/openai/v1/chat/completions"
        );
        assert_eq!(client.model, "llama-3.3-70b-versatile");
    }
}
