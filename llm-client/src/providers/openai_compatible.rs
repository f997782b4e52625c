//! OpenAI-compatible chat-completions provider
//!
//! Covers OpenRouter and local Ollama; both capabilities are expressed as
//! chat prompts against the configured models.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::{LlmError, Result};
use crate::provider::{GenerateRequest, LlmProvider, SummarizeRequest};

const OPENROUTER_BASE_URL: &str = "https://openrouter.ai/api/v1";
const OLLAMA_BASE_URL: &str = "http://localhost:11434/v1";

/// Provider for OpenAI-compatible chat endpoints
pub struct OpenAICompatibleProvider {
    base_url: String,
    summarization_model: String,
    generation_model: String,
    api_key: Option<String>,
    client: Client,
    provider_name: &'static str,
}

impl OpenAICompatibleProvider {
    /// Create an OpenRouter provider
    pub fn openrouter(
        summarization_model: &str,
        generation_model: &str,
        api_key: String,
    ) -> Result<Self> {
        Ok(Self {
            base_url: OPENROUTER_BASE_URL.to_string(),
            summarization_model: summarization_model.to_string(),
            generation_model: generation_model.to_string(),
            api_key: Some(api_key),
            client: Client::new(),
            provider_name: "OpenRouter",
        })
    }

    /// Create an Ollama provider (local, no API key)
    pub fn ollama(
        summarization_model: &str,
        generation_model: &str,
        base_url: Option<String>,
    ) -> Result<Self> {
        Ok(Self {
            base_url: base_url.unwrap_or_else(|| OLLAMA_BASE_URL.to_string()),
            summarization_model: summarization_model.to_string(),
            generation_model: generation_model.to_string(),
            api_key: None,
            client: Client::new(),
            provider_name: "Ollama",
        })
    }

    async fn chat(&self, model: &str, prompt: String, max_tokens: u32) -> Result<String> {
        let url = format!("{}/chat/completions", self.base_url);

        let api_request = ChatRequest {
            model: model.to_string(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: prompt,
            }],
            max_tokens,
            temperature: 0.3,
        };

        let mut request = self.client.post(&url).json(&api_request);
        if let Some(key) = &self.api_key {
            request = request.header("Authorization", format!("Bearer {}", key));
        }

        let response = request.send().await.map_err(|e| LlmError::ApiError {
            message: format!("Request failed: {}", e),
            status_code: None,
        })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            let message =
                if let Ok(error_response) = serde_json::from_str::<ErrorResponse>(&error_text) {
                    error_response.error.message
                } else {
                    error_text
                };

            if status.as_u16() == 503 {
                return Err(LlmError::ServerOverloaded { message });
            }
            if status.as_u16() == 429 {
                return Err(LlmError::RateLimited { retry_after: None });
            }

            return Err(LlmError::ApiError {
                message,
                status_code: Some(status.as_u16()),
            });
        }

        let api_response: ChatResponse =
            response.json().await.map_err(|e| LlmError::ApiError {
                message: format!("Failed to parse response: {}", e),
                status_code: None,
            })?;

        api_response
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content.trim().to_string())
            .filter(|s| !s.is_empty())
            .ok_or(LlmError::EmptyResponse)
    }
}

// Chat completions request/response types

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: String,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ApiError,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}

#[async_trait]
impl LlmProvider for OpenAICompatibleProvider {
    async fn summarize(&self, request: SummarizeRequest) -> Result<String> {
        let prompt = format!(
            "Summarize the following text in roughly {} to {} words. \
             Reply with only the summary.\n\n{}",
            request.min_length, request.max_length, request.text
        );

        // Words-to-tokens margin: the bound is advisory for chat models
        let max_tokens = request.max_length.saturating_mul(2).max(64);

        self.chat(&self.summarization_model, prompt, max_tokens)
            .await
    }

    async fn generate(&self, request: GenerateRequest) -> Result<String> {
        let prompt = format!(
            "Write a short article about {}. Keep it under {} words and \
             suitable for being read aloud.",
            request.topic, request.max_length
        );

        let max_tokens = request.max_length.saturating_mul(2).max(64);

        self.chat(&self.generation_model, prompt, max_tokens).await
    }

    fn name(&self) -> &'static str {
        self.provider_name
    }

    fn is_available(&self) -> Result<()> {
        Ok(())
    }
}
