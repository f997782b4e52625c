//! Pipeline orchestrator.
//!
//! Sequences extraction (or topic text generation), chunking, per-chunk
//! summarization, and speech synthesis for exactly one request at a time:
//!
//! ```text
//! Idle -> Extracting -> Chunking -> Summarizing -> Synthesizing -> Done
//!                \            \            \              \
//!                 `------------`------------`--> Failed(stage, cause)
//! ```
//!
//! A synthesis failure is partial success: the combined summary is still
//! delivered, only the audio is marked failed. Temporary storage is a
//! per-request directory released on every exit path.

use std::fmt;
use std::path::Path;

use llm_client::{GenerateRequest, LlmError, LlmProvider};
use thiserror::Error;

use crate::extract;
use crate::summarize::{self, SummaryBounds};
use crate::text::{self, ChunkMode, chunker};
use crate::tts::{TtsBackend, TtsError, VoiceOptions};

/// One pipeline request.
#[derive(Debug, Clone)]
pub enum PipelineInput {
    /// Raw document bytes plus an optional filename hint
    Document {
        bytes: Vec<u8>,
        name: Option<String>,
    },
    /// A topic to generate a short article about
    Topic(String),
}

/// The stage a failure is reported against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Extracting,
    Chunking,
    Summarizing,
    Synthesizing,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Extracting => "extracting",
            Stage::Chunking => "chunking",
            Stage::Summarizing => "summarizing",
            Stage::Synthesizing => "synthesizing",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("unsupported or unreadable document format")]
    UnsupportedFormat,

    #[error("invalid argument ({stage}): {reason}")]
    InvalidArgument { stage: Stage, reason: String },

    #[error("text generation for topic failed: {0}")]
    GenerationFailed(#[source] LlmError),

    #[error("summarization failed on chunk {index}: {source}")]
    SummarizationFailed {
        index: usize,
        #[source]
        source: LlmError,
    },

    #[error("temporary storage failed: {0}")]
    Storage(#[from] std::io::Error),
}

impl PipelineError {
    /// The stage this failure belongs to.
    pub fn stage(&self) -> Stage {
        match self {
            PipelineError::UnsupportedFormat => Stage::Extracting,
            PipelineError::InvalidArgument { stage, .. } => *stage,
            PipelineError::GenerationFailed(_) => Stage::Extracting,
            PipelineError::SummarizationFailed { .. } => Stage::Summarizing,
            PipelineError::Storage(_) => Stage::Synthesizing,
        }
    }
}

/// Outcome of the synthesis stage.
///
/// Synthesis failure does not discard the summary, so it lives inside the
/// successful pipeline output rather than in `PipelineError`.
#[derive(Debug)]
pub enum AudioOutcome {
    Ready(Vec<u8>),
    Failed(TtsError),
}

impl AudioOutcome {
    pub fn bytes(&self) -> Option<&[u8]> {
        match self {
            AudioOutcome::Ready(bytes) => Some(bytes),
            AudioOutcome::Failed(_) => None,
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, AudioOutcome::Ready(_))
    }
}

/// Result of a completed request.
#[derive(Debug)]
pub struct PipelineOutput {
    /// Space-joined per-chunk summaries, in original chunk order
    pub combined_summary: String,
    /// MP3 bytes, or the synthesis failure
    pub audio: AudioOutcome,
}

/// Progress snapshot passed to the caller's callback.
#[derive(Debug, Clone, Copy)]
pub struct Progress {
    pub stage: Stage,
    /// Chunks summarized so far (Summarizing stage only)
    pub completed: usize,
    /// Total chunk count (Summarizing stage only)
    pub total: usize,
}

/// Per-request knobs, fixed at pipeline construction.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub chunk_size: usize,
    pub chunk_mode: ChunkMode,
    pub summary: SummaryBounds,
    /// Length bound for topic-mode text generation
    pub generated_text_length: u32,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            chunk_size: chunker::DEFAULT_CHUNK_SIZE,
            chunk_mode: ChunkMode::Sentences,
            summary: SummaryBounds::default(),
            generated_text_length: 500,
        }
    }
}

/// The orchestrator. Holds the immutable capability handles; all
/// per-request state lives on the stack of `run`.
pub struct Pipeline {
    llm: Box<dyn LlmProvider>,
    tts: Box<dyn TtsBackend>,
    options: PipelineOptions,
}

impl Pipeline {
    pub fn new(
        llm: Box<dyn LlmProvider>,
        tts: Box<dyn TtsBackend>,
        options: PipelineOptions,
    ) -> Self {
        Self { llm, tts, options }
    }

    /// Run one request to completion.
    pub async fn run(
        &self,
        input: PipelineInput,
        voice: &VoiceOptions,
    ) -> Result<PipelineOutput, PipelineError> {
        self.run_with_progress(input, voice, |_| {}).await
    }

    /// Run one request, reporting stage transitions and per-chunk
    /// summarization progress through `on_progress`.
    pub async fn run_with_progress(
        &self,
        input: PipelineInput,
        voice: &VoiceOptions,
        mut on_progress: impl FnMut(Progress),
    ) -> Result<PipelineOutput, PipelineError> {
        self.validate(&input, voice)?;

        // Request-scoped staging directory; dropped (and deleted) on
        // every exit path out of this function.
        let staging = tempfile::tempdir()?;

        // Extracting
        on_progress(Progress {
            stage: Stage::Extracting,
            completed: 0,
            total: 0,
        });
        let document_text = self.extract_stage(input).await?;

        // Chunking
        on_progress(Progress {
            stage: Stage::Chunking,
            completed: 0,
            total: 0,
        });
        let chunks = chunker::chunk(&document_text, self.options.chunk_size, self.options.chunk_mode)
            .map_err(|e| PipelineError::InvalidArgument {
                stage: Stage::Chunking,
                reason: e.to_string(),
            })?;
        log::debug!(
            "chunked {} chars into {} chunk(s)",
            document_text.chars().count(),
            chunks.len()
        );

        // Summarizing
        on_progress(Progress {
            stage: Stage::Summarizing,
            completed: 0,
            total: chunks.len(),
        });
        let summaries = summarize::summarize_chunks(
            self.llm.as_ref(),
            &chunks,
            self.options.summary,
            |completed, total| {
                on_progress(Progress {
                    stage: Stage::Summarizing,
                    completed,
                    total,
                })
            },
        )
        .await
        .map_err(|e| PipelineError::SummarizationFailed {
            index: e.index,
            source: e.source,
        })?;

        let combined_summary =
            text::sanitize_for_synthesis(&summarize::combine_summaries(&summaries));

        // Synthesizing
        on_progress(Progress {
            stage: Stage::Synthesizing,
            completed: 0,
            total: 0,
        });
        let audio = self
            .synthesize_stage(&combined_summary, voice, staging.path())
            .await;

        if let AudioOutcome::Failed(ref err) = audio {
            log::warn!("synthesis failed, delivering summary only: {}", err);
        }

        Ok(PipelineOutput {
            combined_summary,
            audio,
        })
    }

    /// Argument validation on entry, tagged with the stage that owns
    /// each argument.
    fn validate(&self, input: &PipelineInput, voice: &VoiceOptions) -> Result<(), PipelineError> {
        if self.options.chunk_size == 0 {
            return Err(PipelineError::InvalidArgument {
                stage: Stage::Chunking,
                reason: "chunk size must be greater than zero".to_string(),
            });
        }

        if !voice.is_valid() {
            return Err(PipelineError::InvalidArgument {
                stage: Stage::Synthesizing,
                reason: "voice configuration must name a language and a voice".to_string(),
            });
        }

        if let PipelineInput::Topic(topic) = input {
            if topic.trim().is_empty() {
                return Err(PipelineError::InvalidArgument {
                    stage: Stage::Extracting,
                    reason: "topic must not be empty".to_string(),
                });
            }
        }

        Ok(())
    }

    /// Extracting stage: document text extraction, or topic-mode text
    /// generation through the language model.
    async fn extract_stage(&self, input: PipelineInput) -> Result<String, PipelineError> {
        let text = match input {
            PipelineInput::Document { bytes, name } => {
                extract::extract_text(&bytes, name.as_deref())
                    .map_err(|_| PipelineError::UnsupportedFormat)?
            }
            PipelineInput::Topic(topic) => self
                .llm
                .generate(GenerateRequest {
                    topic,
                    max_length: self.options.generated_text_length,
                })
                .await
                .map_err(PipelineError::GenerationFailed)?,
        };

        if text.trim().is_empty() {
            return Err(PipelineError::UnsupportedFormat);
        }

        Ok(text)
    }

    /// Synthesizing stage. Failures are folded into the outcome rather
    /// than propagated; the summary survives them.
    async fn synthesize_stage(
        &self,
        combined_summary: &str,
        voice: &VoiceOptions,
        staging_dir: &Path,
    ) -> AudioOutcome {
        let length = combined_summary.chars().count();
        let limit = self.tts.max_input_chars();
        if length > limit {
            return AudioOutcome::Failed(TtsError::InputTooLong { length, limit });
        }

        match self.tts.synthesize(combined_summary, voice).await {
            Ok(bytes) => match stage_audio(staging_dir, &bytes) {
                Ok(delivered) => AudioOutcome::Ready(delivered),
                Err(e) => AudioOutcome::Failed(TtsError::Io(e)),
            },
            Err(e) => AudioOutcome::Failed(e),
        }
    }
}

/// Write the audio artifact into the request's staging directory and
/// read it back for delivery. The file lives only as long as the
/// directory; callers never see the path.
fn stage_audio(dir: &Path, bytes: &[u8]) -> std::io::Result<Vec<u8>> {
    let path = dir.join("podcast.mp3");
    std::fs::write(&path, bytes)?;
    std::fs::read(&path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use llm_client::MockProvider;
    use std::sync::{Arc, Mutex};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Mock synthesis backend; clones share call-recording state.
    #[derive(Clone)]
    struct MockTts {
        bytes: Vec<u8>,
        fail: bool,
        calls: Arc<AtomicUsize>,
        last_text: Arc<Mutex<Option<String>>>,
    }

    impl MockTts {
        fn returning(bytes: &[u8]) -> Self {
            Self {
                bytes: bytes.to_vec(),
                fail: false,
                calls: Arc::new(AtomicUsize::new(0)),
                last_text: Arc::new(Mutex::new(None)),
            }
        }

        fn failing() -> Self {
            Self {
                bytes: Vec::new(),
                fail: true,
                calls: Arc::new(AtomicUsize::new(0)),
                last_text: Arc::new(Mutex::new(None)),
            }
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        fn last_text(&self) -> Option<String> {
            self.last_text.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl TtsBackend for MockTts {
        async fn synthesize(
            &self,
            text: &str,
            _options: &VoiceOptions,
        ) -> Result<Vec<u8>, TtsError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_text.lock().unwrap() = Some(text.to_string());

            if self.fail {
                return Err(TtsError::ApiError {
                    message: "quota exceeded".to_string(),
                    status_code: Some(429),
                });
            }
            Ok(self.bytes.clone())
        }

        fn max_input_chars(&self) -> usize {
            5000
        }

        fn name(&self) -> &'static str {
            "mock-tts"
        }
    }

    fn word_pipeline(llm: MockProvider, tts: MockTts, chunk_size: usize) -> Pipeline {
        Pipeline::new(
            Box::new(llm),
            Box::new(tts),
            PipelineOptions {
                chunk_size,
                chunk_mode: ChunkMode::Words,
                summary: SummaryBounds::default(),
                generated_text_length: 500,
            },
        )
    }

    fn document(text: &str) -> PipelineInput {
        PipelineInput::Document {
            bytes: text.as_bytes().to_vec(),
            name: Some("input.txt".to_string()),
        }
    }

    /// Fifty short words stay well under a 1024-char bound.
    fn fifty_words() -> String {
        (0..50).map(|i| format!("word{i}")).collect::<Vec<_>>().join(" ")
    }

    /// Three marker words, each followed by twelve 12-char filler words.
    /// Each group is 160-161 chars, so a 165-char bound packs exactly one
    /// group per chunk: the accumulation crosses the bound twice.
    fn three_group_text() -> String {
        let mut text = String::new();
        for marker in ["alpha", "beta", "gamma"] {
            text.push_str(marker);
            for i in 0..12 {
                text.push_str(&format!(" filler{i:02}word"));
            }
            text.push(' ');
        }
        text
    }

    const THREE_GROUP_BOUND: usize = 165;

    #[tokio::test]
    async fn test_scenario_a_single_chunk_single_synthesis_call() {
        let tts = MockTts::returning(b"MP3");
        let pipeline = word_pipeline(MockProvider::echo_first_word(), tts.clone(), 1024);

        let output = pipeline
            .run(document(&fifty_words()), &VoiceOptions::default())
            .await
            .unwrap();

        // One chunk -> one summary -> synthesis called once with it
        assert_eq!(output.combined_summary, "word0");
        assert_eq!(tts.call_count(), 1);
        assert_eq!(tts.last_text().as_deref(), Some("word0"));
        assert_eq!(output.audio.bytes(), Some(&b"MP3"[..]));
    }

    #[tokio::test]
    async fn test_scenario_b_three_chunks_in_order() {
        let tts = MockTts::returning(b"MP3");
        let pipeline = word_pipeline(
            MockProvider::echo_first_word(),
            tts.clone(),
            THREE_GROUP_BOUND,
        );

        let output = pipeline
            .run(document(&three_group_text()), &VoiceOptions::default())
            .await
            .unwrap();

        // Three chunks, each summarized independently, combined in order
        assert_eq!(output.combined_summary, "alpha beta gamma");
        assert_eq!(tts.call_count(), 1);
        assert_eq!(tts.last_text().as_deref(), Some("alpha beta gamma"));
    }

    #[tokio::test]
    async fn test_scenario_c_summarization_failure_reports_index_and_skips_synthesis() {
        let llm = MockProvider::fails_on_call(
            1,
            llm_client::LlmError::ApiError {
                message: "model choked".to_string(),
                status_code: Some(500),
            },
        );
        let tts = MockTts::returning(b"MP3");
        let pipeline = word_pipeline(llm, tts.clone(), THREE_GROUP_BOUND);

        let err = pipeline
            .run(document(&three_group_text()), &VoiceOptions::default())
            .await
            .unwrap_err();

        assert_eq!(err.stage(), Stage::Summarizing);
        match err {
            PipelineError::SummarizationFailed { index, .. } => assert_eq!(index, 1),
            other => panic!("expected SummarizationFailed, got {other:?}"),
        }

        // No partial summary escapes and synthesis is never reached
        assert_eq!(tts.call_count(), 0);
    }

    #[tokio::test]
    async fn test_scenario_d_synthesis_failure_keeps_summary() {
        let pipeline = word_pipeline(MockProvider::echo_first_word(), MockTts::failing(), 1024);

        let output = pipeline
            .run(document(&fifty_words()), &VoiceOptions::default())
            .await
            .unwrap();

        assert_eq!(output.combined_summary, "word0");
        assert!(!output.audio.is_ready());
        assert!(output.audio.bytes().is_none());
        match output.audio {
            AudioOutcome::Failed(TtsError::ApiError { status_code, .. }) => {
                assert_eq!(status_code, Some(429));
            }
            other => panic!("expected failed audio outcome, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_topic_mode_generates_then_summarizes() {
        let tts = MockTts::returning(b"MP3");
        let pipeline = word_pipeline(MockProvider::echo_first_word(), tts.clone(), 1024);

        let output = pipeline
            .run(
                PipelineInput::Topic("the history of coffee".to_string()),
                &VoiceOptions::default(),
            )
            .await
            .unwrap();

        // generate() echoes "the", then summarize() echoes it again
        assert_eq!(output.combined_summary, "the");
        assert_eq!(tts.call_count(), 1);
    }

    #[tokio::test]
    async fn test_empty_topic_is_invalid() {
        let pipeline =
            word_pipeline(MockProvider::echo_first_word(), MockTts::returning(b"x"), 1024);

        let err = pipeline
            .run(PipelineInput::Topic("  ".to_string()), &VoiceOptions::default())
            .await
            .unwrap_err();

        assert!(matches!(err, PipelineError::InvalidArgument { .. }));
        assert_eq!(err.stage(), Stage::Extracting);
    }

    #[tokio::test]
    async fn test_zero_chunk_size_is_invalid() {
        let pipeline =
            word_pipeline(MockProvider::echo_first_word(), MockTts::returning(b"x"), 0);

        let err = pipeline
            .run(document("some text"), &VoiceOptions::default())
            .await
            .unwrap_err();

        assert!(matches!(err, PipelineError::InvalidArgument { .. }));
        assert_eq!(err.stage(), Stage::Chunking);
    }

    #[tokio::test]
    async fn test_empty_voice_config_is_invalid() {
        let pipeline =
            word_pipeline(MockProvider::echo_first_word(), MockTts::returning(b"x"), 1024);

        let voice = VoiceOptions::new().with_voice("");
        let err = pipeline
            .run(document("some text"), &voice)
            .await
            .unwrap_err();

        assert!(matches!(err, PipelineError::InvalidArgument { .. }));
        assert_eq!(err.stage(), Stage::Synthesizing);
    }

    #[tokio::test]
    async fn test_unreadable_document_is_unsupported() {
        let pipeline =
            word_pipeline(MockProvider::echo_first_word(), MockTts::returning(b"x"), 1024);

        let input = PipelineInput::Document {
            bytes: vec![0xFF, 0xFE, 0x00, 0x01],
            name: None,
        };
        let err = pipeline.run(input, &VoiceOptions::default()).await.unwrap_err();

        assert!(matches!(err, PipelineError::UnsupportedFormat));
        assert_eq!(err.stage(), Stage::Extracting);
    }

    #[tokio::test]
    async fn test_empty_document_is_unsupported() {
        let pipeline =
            word_pipeline(MockProvider::echo_first_word(), MockTts::returning(b"x"), 1024);

        let err = pipeline
            .run(document("   \n  "), &VoiceOptions::default())
            .await
            .unwrap_err();

        assert!(matches!(err, PipelineError::UnsupportedFormat));
    }

    #[tokio::test]
    async fn test_oversized_summary_fails_synthesis_but_keeps_summary() {
        // Force the combined summary over the service limit with a fixed
        // long response.
        let long_summary = "x".repeat(6000);
        let llm = MockProvider::always_succeeds(&long_summary);
        let tts = MockTts::returning(b"MP3");
        let pipeline = word_pipeline(llm, tts.clone(), 1024);

        let output = pipeline
            .run(document(&fifty_words()), &VoiceOptions::default())
            .await
            .unwrap();

        assert_eq!(output.combined_summary.len(), 6000);
        assert!(matches!(
            output.audio,
            AudioOutcome::Failed(TtsError::InputTooLong { .. })
        ));
        // The orchestrator never even dials the service
        assert_eq!(tts.call_count(), 0);
    }

    #[tokio::test]
    async fn test_progress_reports_stages_in_order() {
        let pipeline =
            word_pipeline(MockProvider::echo_first_word(), MockTts::returning(b"x"), 1024);

        let mut stages = Vec::new();
        pipeline
            .run_with_progress(document(&fifty_words()), &VoiceOptions::default(), |p| {
                stages.push(p.stage)
            })
            .await
            .unwrap();

        assert_eq!(
            stages,
            vec![
                Stage::Extracting,
                Stage::Chunking,
                Stage::Summarizing,
                Stage::Summarizing, // one chunk completed
                Stage::Synthesizing,
            ]
        );
    }

    #[test]
    fn test_staged_audio_is_removed_with_the_request_directory() {
        let dir = tempfile::tempdir().unwrap();
        let staged_path = dir.path().join("podcast.mp3");

        let delivered = stage_audio(dir.path(), b"MP3 BYTES").unwrap();
        assert_eq!(delivered, b"MP3 BYTES");
        assert!(staged_path.exists());

        let parent = dir.path().to_path_buf();
        drop(dir);
        assert!(!staged_path.exists());
        assert!(!parent.exists());
    }

    #[tokio::test]
    async fn test_audio_round_trips_through_staging() {
        let payload: Vec<u8> = (0..=255).collect();
        let pipeline = word_pipeline(
            MockProvider::echo_first_word(),
            MockTts::returning(&payload),
            1024,
        );

        let output = pipeline
            .run(document(&fifty_words()), &VoiceOptions::default())
            .await
            .unwrap();

        assert_eq!(output.audio.bytes(), Some(payload.as_slice()));
    }
}
