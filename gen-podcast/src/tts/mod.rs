//! Speech synthesis backend trait and types.

pub mod google;

use async_trait::async_trait;
use thiserror::Error;

/// Voice and audio configuration for one synthesis request.
#[derive(Debug, Clone)]
pub struct VoiceOptions {
    /// BCP-47 language code (e.g. "en-US")
    pub language_code: String,
    /// Voice identity (e.g. "en-US-Wavenet-F")
    pub voice_name: String,
    /// SSML gender hint (NEUTRAL, FEMALE, MALE)
    pub ssml_gender: String,
    /// Speaking rate (0.25-4.0, default 1.0)
    pub speaking_rate: f32,
}

impl Default for VoiceOptions {
    fn default() -> Self {
        Self {
            language_code: "en-US".to_string(),
            voice_name: "en-US-Wavenet-F".to_string(),
            ssml_gender: "FEMALE".to_string(),
            speaking_rate: 1.0,
        }
    }
}

impl VoiceOptions {
    /// Create new voice options with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the language code.
    pub fn with_language(mut self, code: impl Into<String>) -> Self {
        self.language_code = code.into();
        self
    }

    /// Set the voice name.
    pub fn with_voice(mut self, name: impl Into<String>) -> Self {
        self.voice_name = name.into();
        self
    }

    /// Set the SSML gender hint.
    pub fn with_gender(mut self, gender: impl Into<String>) -> Self {
        self.ssml_gender = gender.into();
        self
    }

    /// Set the speaking rate.
    pub fn with_speaking_rate(mut self, rate: f32) -> Self {
        self.speaking_rate = rate.clamp(0.25, 4.0);
        self
    }

    /// True when the language and voice fields carry usable values.
    pub fn is_valid(&self) -> bool {
        !self.language_code.trim().is_empty() && !self.voice_name.trim().is_empty()
    }
}

#[derive(Debug, Error)]
pub enum TtsError {
    #[error("credentials unavailable: set {env_var} or add the key to the config")]
    MissingCredentials { env_var: &'static str },

    #[error("synthesis request text is empty")]
    EmptyInput,

    #[error("synthesis request text too long: {length} chars exceeds the {limit}-char limit")]
    InputTooLong { length: usize, limit: usize },

    #[error("TTS API error{}: {message}", status_code.map(|c| format!(" (HTTP {})", c)).unwrap_or_default())]
    ApiError {
        message: String,
        status_code: Option<u16>,
    },

    #[error("failed to decode audio payload: {0}")]
    InvalidPayload(String),

    #[error("failed to stage audio output: {0}")]
    Io(#[from] std::io::Error),
}

/// Speech synthesis backend trait.
#[async_trait]
pub trait TtsBackend: Send + Sync {
    /// Synthesize text to encoded audio bytes (MP3).
    async fn synthesize(&self, text: &str, options: &VoiceOptions) -> Result<Vec<u8>, TtsError>;

    /// Maximum request text length, in characters.
    fn max_input_chars(&self) -> usize;

    /// Backend name for display.
    fn name(&self) -> &'static str;
}
