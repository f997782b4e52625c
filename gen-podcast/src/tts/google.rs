//! Google Cloud Text-to-Speech backend.
//!
//! Direct HTTP implementation of the `text:synthesize` REST endpoint. The
//! response carries base64-encoded MP3 bytes which are decoded before
//! being handed back to the pipeline.

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{TtsBackend, TtsError, VoiceOptions};

const GOOGLE_TTS_URL: &str = "https://texttospeech.googleapis.com/v1/text:synthesize";

/// The service rejects requests above 5000 characters.
pub const MAX_INPUT_CHARS: usize = 5000;

/// Google Cloud TTS backend.
pub struct GoogleTtsBackend {
    api_key: String,
    client: Client,
}

impl GoogleTtsBackend {
    /// Environment variable holding the API key.
    pub const ENV_VAR: &'static str = "GOOGLE_TTS_API_KEY";

    /// Create a backend from an explicit API key.
    pub fn new(api_key: String) -> Result<Self, TtsError> {
        if api_key.trim().is_empty() {
            return Err(TtsError::MissingCredentials {
                env_var: Self::ENV_VAR,
            });
        }

        Ok(Self {
            api_key,
            client: Client::new(),
        })
    }

    /// Resolve credentials from the config value first, then the
    /// environment. Meant to run once at process startup; an absent key
    /// fails the whole process, not a single request.
    pub fn from_config(config_key: Option<String>) -> Result<Self, TtsError> {
        let key = config_key
            .filter(|k| !k.trim().is_empty())
            .or_else(|| std::env::var(Self::ENV_VAR).ok())
            .filter(|k| !k.trim().is_empty())
            .ok_or(TtsError::MissingCredentials {
                env_var: Self::ENV_VAR,
            })?;

        Self::new(key)
    }
}

// REST request/response types

#[derive(Debug, Serialize)]
struct SynthesizeRequest<'a> {
    input: SynthesisInput<'a>,
    voice: VoiceSelectionParams<'a>,
    #[serde(rename = "audioConfig")]
    audio_config: AudioConfig,
}

#[derive(Debug, Serialize)]
struct SynthesisInput<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
struct VoiceSelectionParams<'a> {
    #[serde(rename = "languageCode")]
    language_code: &'a str,
    name: &'a str,
    #[serde(rename = "ssmlGender")]
    ssml_gender: &'a str,
}

#[derive(Debug, Serialize)]
struct AudioConfig {
    #[serde(rename = "audioEncoding")]
    audio_encoding: &'static str,
    #[serde(rename = "speakingRate")]
    speaking_rate: f32,
}

#[derive(Debug, Deserialize)]
struct SynthesizeResponse {
    #[serde(rename = "audioContent")]
    audio_content: String,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

#[async_trait]
impl TtsBackend for GoogleTtsBackend {
    async fn synthesize(&self, text: &str, options: &VoiceOptions) -> Result<Vec<u8>, TtsError> {
        if text.trim().is_empty() {
            return Err(TtsError::EmptyInput);
        }

        let length = text.chars().count();
        if length > MAX_INPUT_CHARS {
            return Err(TtsError::InputTooLong {
                length,
                limit: MAX_INPUT_CHARS,
            });
        }

        let api_request = SynthesizeRequest {
            input: SynthesisInput { text },
            voice: VoiceSelectionParams {
                language_code: &options.language_code,
                name: &options.voice_name,
                ssml_gender: &options.ssml_gender,
            },
            audio_config: AudioConfig {
                audio_encoding: "MP3",
                speaking_rate: options.speaking_rate,
            },
        };

        let response = self
            .client
            .post(GOOGLE_TTS_URL)
            .query(&[("key", self.api_key.as_str())])
            .json(&api_request)
            .send()
            .await
            .map_err(|e| TtsError::ApiError {
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

            return Err(TtsError::ApiError {
                message,
                status_code: Some(status.as_u16()),
            });
        }

        let api_response: SynthesizeResponse =
            response.json().await.map_err(|e| TtsError::ApiError {
                message: format!("Failed to parse response: {}", e),
                status_code: None,
            })?;

        let audio = BASE64
            .decode(api_response.audio_content.as_bytes())
            .map_err(|e| TtsError::InvalidPayload(e.to_string()))?;

        if audio.is_empty() {
            return Err(TtsError::InvalidPayload(
                "empty audio content".to_string(),
            ));
        }

        Ok(audio)
    }

    fn max_input_chars(&self) -> usize {
        MAX_INPUT_CHARS
    }

    fn name(&self) -> &'static str {
        "Google Cloud TTS"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_key_is_rejected() {
        assert!(matches!(
            GoogleTtsBackend::new("  ".to_string()),
            Err(TtsError::MissingCredentials { .. })
        ));
    }

    #[test]
    fn test_config_key_wins_over_env() {
        let backend = GoogleTtsBackend::from_config(Some("config-key".to_string())).unwrap();
        assert_eq!(backend.api_key, "config-key");
    }

    #[tokio::test]
    async fn test_oversized_input_fails_before_any_request() {
        let backend = GoogleTtsBackend::new("test-key".to_string()).unwrap();
        let text = "x".repeat(MAX_INPUT_CHARS + 1);

        let result = backend.synthesize(&text, &VoiceOptions::default()).await;
        assert!(matches!(
            result,
            Err(TtsError::InputTooLong { length, limit })
                if length == MAX_INPUT_CHARS + 1 && limit == MAX_INPUT_CHARS
        ));
    }

    #[tokio::test]
    async fn test_empty_input_fails_before_any_request() {
        let backend = GoogleTtsBackend::new("test-key".to_string()).unwrap();

        let result = backend.synthesize("   ", &VoiceOptions::default()).await;
        assert!(matches!(result, Err(TtsError::EmptyInput)));
    }

    #[test]
    fn test_request_serialization_uses_rest_field_names() {
        let request = SynthesizeRequest {
            input: SynthesisInput { text: "Hello" },
            voice: VoiceSelectionParams {
                language_code: "en-US",
                name: "en-US-Wavenet-F",
                ssml_gender: "FEMALE",
            },
            audio_config: AudioConfig {
                audio_encoding: "MP3",
                speaking_rate: 1.0,
            },
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["input"]["text"], "Hello");
        assert_eq!(json["voice"]["languageCode"], "en-US");
        assert_eq!(json["voice"]["ssmlGender"], "FEMALE");
        assert_eq!(json["audioConfig"]["audioEncoding"], "MP3");
        assert_eq!(json["audioConfig"]["speakingRate"], 1.0);
    }
}
