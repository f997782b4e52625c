//! gen-podcast configuration management.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

// Defaults for summarization and synthesis
const DEFAULT_CHUNK_SIZE: usize = 1024;
const DEFAULT_CHUNK_MODE: &str = "sentences";
const DEFAULT_VOICE: &str = "en-US-Wavenet-F";
const DEFAULT_LANGUAGE: &str = "en-US";
const DEFAULT_SSML_GENDER: &str = "FEMALE";
const DEFAULT_SPEAKING_RATE: f32 = 1.0;
const DEFAULT_SUMMARY_MAX_LENGTH: u32 = 150;
const DEFAULT_SUMMARY_MIN_LENGTH: u32 = 40;
const DEFAULT_GENERATED_TEXT_LENGTH: u32 = 500;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenPodcastConfig {
    /// Google Cloud TTS API key. Falls back to GOOGLE_TTS_API_KEY.
    #[serde(default)]
    pub google_api_key: Option<String>,

    /// llm-client preset to use. None means the client's default.
    #[serde(default)]
    pub model_preset: Option<String>,

    /// Chunk size bound for summarization input, in characters
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Chunking unit: "sentences" or "words"
    #[serde(default = "default_chunk_mode")]
    pub chunk_mode: String,

    /// Synthesis voice name
    #[serde(default = "default_voice")]
    pub voice_name: String,

    /// BCP-47 language code
    #[serde(default = "default_language")]
    pub language_code: String,

    /// SSML gender hint
    #[serde(default = "default_ssml_gender")]
    pub ssml_gender: String,

    /// Speaking rate (0.25-4.0)
    #[serde(default = "default_speaking_rate")]
    pub speaking_rate: f32,

    /// Per-chunk summary upper bound
    #[serde(default = "default_summary_max_length")]
    pub summary_max_length: u32,

    /// Per-chunk summary lower bound
    #[serde(default = "default_summary_min_length")]
    pub summary_min_length: u32,

    /// Length bound for topic-mode article generation
    #[serde(default = "default_generated_text_length")]
    pub generated_text_length: u32,
}

fn default_chunk_size() -> usize {
    DEFAULT_CHUNK_SIZE
}

fn default_chunk_mode() -> String {
    DEFAULT_CHUNK_MODE.to_string()
}

fn default_voice() -> String {
    DEFAULT_VOICE.to_string()
}

fn default_language() -> String {
    DEFAULT_LANGUAGE.to_string()
}

fn default_ssml_gender() -> String {
    DEFAULT_SSML_GENDER.to_string()
}

fn default_speaking_rate() -> f32 {
    DEFAULT_SPEAKING_RATE
}

fn default_summary_max_length() -> u32 {
    DEFAULT_SUMMARY_MAX_LENGTH
}

fn default_summary_min_length() -> u32 {
    DEFAULT_SUMMARY_MIN_LENGTH
}

fn default_generated_text_length() -> u32 {
    DEFAULT_GENERATED_TEXT_LENGTH
}

impl Default for GenPodcastConfig {
    fn default() -> Self {
        Self {
            google_api_key: None,
            model_preset: None,
            chunk_size: default_chunk_size(),
            chunk_mode: default_chunk_mode(),
            voice_name: default_voice(),
            language_code: default_language(),
            ssml_gender: default_ssml_gender(),
            speaking_rate: default_speaking_rate(),
            summary_max_length: default_summary_max_length(),
            summary_min_length: default_summary_min_length(),
            generated_text_length: default_generated_text_length(),
        }
    }
}

impl GenPodcastConfig {
    /// Get the config file path: ~/.config/gen-podcast/gen-podcast.toml
    pub fn config_path() -> Result<PathBuf> {
        let home = std::env::var("HOME").or_else(|_| std::env::var("USERPROFILE"))?;
        Ok(PathBuf::from(home)
            .join(".config")
            .join("gen-podcast")
            .join("gen-podcast.toml"))
    }

    /// Load config from file, returning default if file doesn't exist
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;

        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path)?;
        let config: GenPodcastConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save config to file
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(&path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = GenPodcastConfig::default();
        assert_eq!(config.chunk_size, 1024);
        assert_eq!(config.chunk_mode, "sentences");
        assert_eq!(config.voice_name, "en-US-Wavenet-F");
        assert_eq!(config.language_code, "en-US");
        assert_eq!(config.summary_max_length, 150);
        assert_eq!(config.summary_min_length, 40);
        assert!(config.google_api_key.is_none());
        assert!(config.model_preset.is_none());
    }

    #[test]
    fn test_config_path() {
        let path = GenPodcastConfig::config_path();
        assert!(path.is_ok());
        let path = path.unwrap();
        assert!(path.ends_with("gen-podcast/gen-podcast.toml"));
    }

    #[test]
    fn test_parse_config() {
        let toml_str = r#"
voice_name = "en-GB-Wavenet-B"
language_code = "en-GB"
ssml_gender = "MALE"
chunk_size = 2048
chunk_mode = "words"
speaking_rate = 1.2
"#;
        let config: GenPodcastConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.voice_name, "en-GB-Wavenet-B");
        assert_eq!(config.language_code, "en-GB");
        assert_eq!(config.ssml_gender, "MALE");
        assert_eq!(config.chunk_size, 2048);
        assert_eq!(config.chunk_mode, "words");
        assert_eq!(config.speaking_rate, 1.2);
        // Unset fields keep their defaults
        assert_eq!(config.summary_max_length, 150);
    }

    #[test]
    fn test_parse_empty_config() {
        let toml_str = "";
        let config: GenPodcastConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.chunk_size, 1024);
        assert_eq!(config.speaking_rate, 1.0);
    }
}
