use async_trait::async_trait;

use crate::error::Result;

/// Request to condense one bounded piece of text.
#[derive(Debug, Clone)]
pub struct SummarizeRequest {
    /// Text to condense. Must fit within the provider's input limit;
    /// the caller is responsible for chunking beforehand.
    pub text: String,
    /// Upper bound for the summary length, in model units (tokens/words).
    pub max_length: u32,
    /// Lower bound for the summary length.
    pub min_length: u32,
}

/// Request to produce a short article about a topic.
#[derive(Debug, Clone)]
pub struct GenerateRequest {
    pub topic: String,
    /// Upper bound for the generated text length, in model units.
    pub max_length: u32,
}

/// Trait for LLM providers.
///
/// Both operations are stateless per call; a provider handle is safe to
/// share across requests.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Condense one chunk of text into a shorter summary.
    async fn summarize(&self, request: SummarizeRequest) -> Result<String>;

    /// Generate a short article about a topic.
    async fn generate(&self, request: GenerateRequest) -> Result<String>;

    /// Get the provider name for display
    fn name(&self) -> &'static str;

    /// Check if the provider is available (API key set, endpoint reachable, etc.)
    fn is_available(&self) -> Result<()>;
}
