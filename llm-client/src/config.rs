use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

use crate::error::{LlmError, Result};

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Preset to use when no --model flag is provided
    #[serde(default = "default_preset")]
    pub default_preset: String,

    /// Named model presets for quick access
    #[serde(default)]
    pub presets: HashMap<String, ModelPreset>,

    /// Provider-specific configuration
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,
}

fn default_preset() -> String {
    "huggingface".to_string()
}

/// A named model configuration.
///
/// Summarization and generation are distinct capabilities; on dedicated
/// inference endpoints (Hugging Face) they map to different models, on
/// chat-completion providers they may name the same model twice.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelPreset {
    /// Provider identifier (huggingface, openrouter, ollama)
    pub provider: String,

    /// Model used for summarization calls
    pub summarization_model: String,

    /// Model used for topic text generation calls
    pub generation_model: String,
}

/// Provider-specific configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// API key (optional, can use env var instead)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Custom base URL (for self-hosted or proxied endpoints)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

impl Config {
    /// Load configuration from the default location
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&config_path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to the default location
    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        // Ensure parent directory exists
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }

    /// Get the configuration file path
    pub fn config_path() -> Result<PathBuf> {
        let home =
            std::env::var("HOME").map_err(|_| LlmError::ConfigError("HOME not set".into()))?;
        Ok(PathBuf::from(home).join(".config/gen-podcast/llm.toml"))
    }

    /// Get a preset by name
    pub fn get_preset(&self, name: &str) -> Result<&ModelPreset> {
        self.presets
            .get(name)
            .ok_or_else(|| LlmError::InvalidPreset(name.to_string()))
    }

    /// Get provider config by provider name
    pub fn get_provider_config(&self, provider: &str) -> Option<&ProviderConfig> {
        self.providers.get(provider)
    }
}

impl Default for Config {
    fn default() -> Self {
        let mut presets = HashMap::new();

        // Default preset: the Hugging Face Inference API with the models the
        // pipeline was designed around.
        presets.insert(
            "huggingface".to_string(),
            ModelPreset {
                provider: "huggingface".to_string(),
                summarization_model: "facebook/bart-large-cnn".to_string(),
                generation_model: "openai-community/gpt2".to_string(),
            },
        );

        Self {
            default_preset: "huggingface".to_string(),
            presets,
            providers: HashMap::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.default_preset, "huggingface");
        assert!(config.presets.contains_key("huggingface"));

        let preset = config.get_preset("huggingface").unwrap();
        assert_eq!(preset.provider, "huggingface");
        assert_eq!(preset.summarization_model, "facebook/bart-large-cnn");
        assert_eq!(preset.generation_model, "openai-community/gpt2");
    }

    #[test]
    fn test_invalid_preset() {
        let config = Config::default();
        let result = config.get_preset("nonexistent");
        assert!(result.is_err());
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.default_preset, config.default_preset);
    }

    #[test]
    fn test_parse_preset_with_provider_config() {
        let toml_str = r#"
default_preset = "local"

[presets.local]
provider = "ollama"
summarization_model = "llama3.2"
generation_model = "llama3.2"

[providers.ollama]
base_url = "http://gpu-box:11434/v1"
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        let preset = config.get_preset("local").unwrap();
        assert_eq!(preset.provider, "ollama");
        assert_eq!(preset.summarization_model, "llama3.2");

        let provider = config.get_provider_config("ollama").unwrap();
        assert_eq!(provider.base_url.as_deref(), Some("http://gpu-box:11434/v1"));
        assert!(provider.api_key.is_none());
    }
}
