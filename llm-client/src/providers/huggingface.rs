//! Hugging Face Inference API provider
//!
//! Direct HTTP implementation against the hosted inference endpoint, using
//! a dedicated summarization model and a dedicated text-generation model.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::error::{LlmError, Result};
use crate::provider::{GenerateRequest, LlmProvider, SummarizeRequest};

const HF_INFERENCE_URL: &str = "https://api-inference.huggingface.co/models";

/// Provider for the Hugging Face Inference API
pub struct HuggingFaceProvider {
    summarization_model: String,
    generation_model: String,
    api_key: Option<String>,
    client: Client,
}

impl HuggingFaceProvider {
    /// Create a new Hugging Face provider.
    ///
    /// The API key is optional; anonymous calls are accepted at a reduced
    /// rate limit.
    pub fn new(
        summarization_model: &str,
        generation_model: &str,
        api_key: Option<String>,
    ) -> Result<Self> {
        let client = Client::new();

        Ok(Self {
            summarization_model: summarization_model.to_string(),
            generation_model: generation_model.to_string(),
            api_key,
            client,
        })
    }

    async fn post_inference<B: Serialize, R: DeserializeOwned>(
        &self,
        model: &str,
        body: &B,
    ) -> Result<R> {
        let url = format!("{}/{}", HF_INFERENCE_URL, model);

        let mut request = self.client.post(&url).json(body);
        if let Some(key) = &self.api_key {
            request = request.header("Authorization", format!("Bearer {}", key));
        }

        let response = request.send().await.map_err(|e| LlmError::ApiError {
            message: format!("Request failed: {}", e),
            status_code: None,
        })?;

        let status = response.status();
        if !status.is_success() {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok());

            let error_text = response.text().await.unwrap_or_default();
            let message =
                if let Ok(error_response) = serde_json::from_str::<ErrorResponse>(&error_text) {
                    error_response.error
                } else {
                    error_text
                };

            // 503 means the model is still loading on the inference fleet
            return match status.as_u16() {
                503 => Err(LlmError::ServerOverloaded { message }),
                429 => Err(LlmError::RateLimited { retry_after }),
                code => Err(LlmError::ApiError {
                    message,
                    status_code: Some(code),
                }),
            };
        }

        response.json().await.map_err(|e| LlmError::ApiError {
            message: format!("Failed to parse response: {}", e),
            status_code: None,
        })
    }
}

// Inference API request/response types

#[derive(Debug, Serialize)]
struct SummarizationRequest<'a> {
    inputs: &'a str,
    parameters: SummarizationParameters,
    options: InferenceOptions,
}

#[derive(Debug, Serialize)]
struct SummarizationParameters {
    max_length: u32,
    min_length: u32,
    do_sample: bool,
}

#[derive(Debug, Serialize)]
struct GenerationRequest<'a> {
    inputs: &'a str,
    parameters: GenerationParameters,
    options: InferenceOptions,
}

#[derive(Debug, Serialize)]
struct GenerationParameters {
    max_length: u32,
    num_return_sequences: u32,
}

#[derive(Debug, Serialize)]
struct InferenceOptions {
    wait_for_model: bool,
}

#[derive(Debug, Deserialize)]
struct SummaryOutput {
    summary_text: String,
}

#[derive(Debug, Deserialize)]
struct GeneratedOutput {
    generated_text: String,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: String,
}

#[async_trait]
impl LlmProvider for HuggingFaceProvider {
    async fn summarize(&self, request: SummarizeRequest) -> Result<String> {
        let api_request = SummarizationRequest {
            inputs: &request.text,
            parameters: SummarizationParameters {
                max_length: request.max_length,
                min_length: request.min_length,
                do_sample: false,
            },
            options: InferenceOptions {
                wait_for_model: true,
            },
        };

        let outputs: Vec<SummaryOutput> = self
            .post_inference(&self.summarization_model, &api_request)
            .await?;

        outputs
            .into_iter()
            .next()
            .map(|o| o.summary_text.trim().to_string())
            .filter(|s| !s.is_empty())
            .ok_or(LlmError::EmptyResponse)
    }

    async fn generate(&self, request: GenerateRequest) -> Result<String> {
        let prompt = format!("A short article about {}:\n\n", request.topic);

        let api_request = GenerationRequest {
            inputs: &prompt,
            parameters: GenerationParameters {
                max_length: request.max_length,
                num_return_sequences: 1,
            },
            options: InferenceOptions {
                wait_for_model: true,
            },
        };

        let outputs: Vec<GeneratedOutput> = self
            .post_inference(&self.generation_model, &api_request)
            .await?;

        // Generation endpoints echo the prompt at the head of the output.
        outputs
            .into_iter()
            .next()
            .map(|o| {
                o.generated_text
                    .strip_prefix(&prompt)
                    .unwrap_or(&o.generated_text)
                    .trim()
                    .to_string()
            })
            .filter(|s| !s.is_empty())
            .ok_or(LlmError::EmptyResponse)
    }

    fn name(&self) -> &'static str {
        "Hugging Face"
    }

    fn is_available(&self) -> Result<()> {
        // Anonymous access is allowed; nothing to verify up front
        Ok(())
    }
}
