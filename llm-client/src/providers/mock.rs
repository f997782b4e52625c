//! Mock LLM provider for testing
//!
//! Provides a configurable mock provider that can simulate failures on
//! specific calls, echo its input, or return canned responses.

use async_trait::async_trait;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::error::{LlmError, Result};
use crate::provider::{GenerateRequest, LlmProvider, SummarizeRequest};

/// What a successful mock call returns.
#[derive(Debug, Clone)]
enum MockReply {
    /// A fixed canned string
    Fixed(String),
    /// The first word of the input text, so callers can assert pairing
    /// and ordering of per-chunk summaries
    FirstWord,
}

/// A mock provider for testing adapter and pipeline behavior
pub struct MockProvider {
    /// Number of leading calls that fail (usize::MAX = always fail)
    fail_count: AtomicUsize,
    /// Exact call index that fails (overrides fail_count when set)
    fail_on: Option<usize>,
    /// Current call count
    call_count: AtomicUsize,
    /// Error to return on failure
    fail_with: Mutex<Option<LlmError>>,
    /// Response produced on success
    reply: MockReply,
    /// Provider name for display
    name: &'static str,
}

impl MockProvider {
    /// Create a provider that always succeeds with a fixed response
    pub fn always_succeeds(response: &str) -> Self {
        Self {
            fail_count: AtomicUsize::new(0),
            fail_on: None,
            call_count: AtomicUsize::new(0),
            fail_with: Mutex::new(None),
            reply: MockReply::Fixed(response.to_string()),
            name: "mock",
        }
    }

    /// Create a provider that echoes the first word of each input
    pub fn echo_first_word() -> Self {
        Self {
            fail_count: AtomicUsize::new(0),
            fail_on: None,
            call_count: AtomicUsize::new(0),
            fail_with: Mutex::new(None),
            reply: MockReply::FirstWord,
            name: "mock",
        }
    }

    /// Create a provider that always fails with the given error
    pub fn always_fails(error: LlmError) -> Self {
        Self {
            fail_count: AtomicUsize::new(usize::MAX),
            fail_on: None,
            call_count: AtomicUsize::new(0),
            fail_with: Mutex::new(Some(error)),
            reply: MockReply::Fixed(String::new()),
            name: "mock",
        }
    }

    /// Create a provider that fails `n` times with the given error, then succeeds
    pub fn fails_then_succeeds(n: usize, error: LlmError, response: &str) -> Self {
        Self {
            fail_count: AtomicUsize::new(n),
            fail_on: None,
            call_count: AtomicUsize::new(0),
            fail_with: Mutex::new(Some(error)),
            reply: MockReply::Fixed(response.to_string()),
            name: "mock",
        }
    }

    /// Create a provider that fails only on call index `n` (0-based),
    /// echoing the first word of the input on every other call
    pub fn fails_on_call(n: usize, error: LlmError) -> Self {
        Self {
            fail_count: AtomicUsize::new(0),
            fail_on: Some(n),
            call_count: AtomicUsize::new(0),
            fail_with: Mutex::new(Some(error)),
            reply: MockReply::FirstWord,
            name: "mock",
        }
    }

    /// Get the number of calls made so far (summarize and generate combined)
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    /// Set a custom provider name
    pub fn with_name(mut self, name: &'static str) -> Self {
        self.name = name;
        self
    }

    fn next_reply(&self, input: &str) -> Result<String> {
        let call_num = self.call_count.fetch_add(1, Ordering::SeqCst);

        let should_fail = match self.fail_on {
            Some(n) => call_num == n,
            None => call_num < self.fail_count.load(Ordering::SeqCst),
        };

        if should_fail {
            let error = self.fail_with.lock().unwrap();
            if let Some(err) = error.as_ref() {
                return Err(clone_error(err));
            }
        }

        Ok(match &self.reply {
            MockReply::Fixed(s) => s.clone(),
            MockReply::FirstWord => input
                .split_whitespace()
                .next()
                .unwrap_or_default()
                .to_string(),
        })
    }
}

#[async_trait]
impl LlmProvider for MockProvider {
    async fn summarize(&self, request: SummarizeRequest) -> Result<String> {
        self.next_reply(&request.text)
    }

    async fn generate(&self, request: GenerateRequest) -> Result<String> {
        self.next_reply(&request.topic)
    }

    fn name(&self) -> &'static str {
        self.name
    }

    fn is_available(&self) -> Result<()> {
        Ok(())
    }
}

/// Clone an LlmError (needed because LlmError doesn't implement Clone)
fn clone_error(err: &LlmError) -> LlmError {
    match err {
        LlmError::MissingApiKey { provider, env_var } => LlmError::MissingApiKey {
            provider: provider.clone(),
            env_var: env_var.clone(),
        },
        LlmError::RateLimited { retry_after } => LlmError::RateLimited {
            retry_after: *retry_after,
        },
        LlmError::ServerOverloaded { message } => LlmError::ServerOverloaded {
            message: message.clone(),
        },
        LlmError::ApiError {
            message,
            status_code,
        } => LlmError::ApiError {
            message: message.clone(),
            status_code: *status_code,
        },
        LlmError::EmptyResponse => LlmError::EmptyResponse,
        LlmError::ConfigError(s) => LlmError::ConfigError(s.clone()),
        LlmError::InvalidPreset(s) => LlmError::InvalidPreset(s.clone()),
        // IO and TOML errors can't be cloned; degrade to a generic error
        LlmError::Io(_) => LlmError::ConfigError("IO error (mock)".to_string()),
        LlmError::TomlParse(_) => LlmError::ConfigError("TOML parse error (mock)".to_string()),
        LlmError::TomlSerialize(_) => {
            LlmError::ConfigError("TOML serialize error (mock)".to_string())
        }
    }
}
