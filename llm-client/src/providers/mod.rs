//! LLM provider implementations

mod huggingface;
pub mod mock;
mod openai_compatible;

pub use huggingface::HuggingFaceProvider;
pub use mock::MockProvider;
pub use openai_compatible::OpenAICompatibleProvider;

use crate::config::{ModelPreset, ProviderConfig};
use crate::error::{LlmError, Result};
use crate::provider::LlmProvider;

/// Supported provider types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    HuggingFace,
    OpenRouter,
    Ollama,
}

impl ProviderKind {
    /// Parse provider kind from string
    pub fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "huggingface" | "hugging-face" | "hf" => Ok(Self::HuggingFace),
            "openrouter" => Ok(Self::OpenRouter),
            "ollama" => Ok(Self::Ollama),
            _ => Err(LlmError::ConfigError(format!("Unknown provider: {}", s))),
        }
    }

    /// Get the environment variable name for this provider's API key
    pub fn env_var(&self) -> Option<&'static str> {
        match self {
            Self::HuggingFace => Some("HF_API_TOKEN"),
            Self::OpenRouter => Some("OPENROUTER_API_KEY"),
            Self::Ollama => None,
        }
    }
}

/// Create a provider instance from a preset and optional config
pub fn get_provider(
    preset: &ModelPreset,
    provider_config: Option<&ProviderConfig>,
) -> Result<Box<dyn LlmProvider>> {
    let kind = ProviderKind::from_str(&preset.provider)?;

    match kind {
        ProviderKind::HuggingFace => {
            // The public inference endpoint accepts anonymous calls at a
            // reduced rate, so the token is optional.
            let api_key = optional_api_key(provider_config, "HF_API_TOKEN");
            Ok(Box::new(HuggingFaceProvider::new(
                &preset.summarization_model,
                &preset.generation_model,
                api_key,
            )?))
        }
        ProviderKind::OpenRouter => {
            let api_key = require_api_key(provider_config, "OPENROUTER_API_KEY", "OpenRouter")?;
            Ok(Box::new(OpenAICompatibleProvider::openrouter(
                &preset.summarization_model,
                &preset.generation_model,
                api_key,
            )?))
        }
        ProviderKind::Ollama => {
            let base_url = provider_config.and_then(|c| c.base_url.clone());
            Ok(Box::new(OpenAICompatibleProvider::ollama(
                &preset.summarization_model,
                &preset.generation_model,
                base_url,
            )?))
        }
    }
}

/// Get API key from config or environment variable, failing when absent
fn require_api_key(
    config: Option<&ProviderConfig>,
    env_var: &str,
    provider_name: &str,
) -> Result<String> {
    optional_api_key(config, env_var).ok_or_else(|| LlmError::MissingApiKey {
        provider: provider_name.to_string(),
        env_var: env_var.to_string(),
    })
}

/// Get API key from config or environment variable, if either is set
fn optional_api_key(config: Option<&ProviderConfig>, env_var: &str) -> Option<String> {
    if let Some(key) = config.and_then(|c| c.api_key.clone()) {
        return Some(key);
    }

    std::env::var(env_var).ok().filter(|k| !k.trim().is_empty())
}
