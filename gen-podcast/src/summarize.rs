//! Summarization adapter: per-chunk summaries, order-preserving.
//!
//! Each chunk goes through one stateless summarization call; there is no
//! cross-chunk context. The first failing chunk aborts the request with
//! its index attached — dropping a chunk silently would hide part of the
//! source document from the listener.

use llm_client::{LlmError, LlmProvider, SummarizeRequest};
use thiserror::Error;

/// Length bounds passed through to the summarization capability.
#[derive(Debug, Clone, Copy)]
pub struct SummaryBounds {
    pub max_length: u32,
    pub min_length: u32,
}

impl Default for SummaryBounds {
    fn default() -> Self {
        Self {
            max_length: 150,
            min_length: 40,
        }
    }
}

/// A per-chunk summarization failure, tagged with the chunk index.
#[derive(Debug, Error)]
#[error("chunk {index} failed to summarize: {source}")]
pub struct SummarizeError {
    pub index: usize,
    #[source]
    pub source: LlmError,
}

/// Summarize every chunk in order.
///
/// Returns one summary per chunk, same order as the input. `on_chunk` is
/// called after each completed chunk with (completed, total).
pub async fn summarize_chunks(
    provider: &dyn LlmProvider,
    chunks: &[String],
    bounds: SummaryBounds,
    mut on_chunk: impl FnMut(usize, usize),
) -> Result<Vec<String>, SummarizeError> {
    let mut summaries = Vec::with_capacity(chunks.len());

    for (index, chunk) in chunks.iter().enumerate() {
        let request = SummarizeRequest {
            text: chunk.clone(),
            max_length: bounds.max_length,
            min_length: bounds.min_length,
        };

        match provider.summarize(request).await {
            Ok(summary) => {
                log::debug!("chunk {}/{} summarized", index + 1, chunks.len());
                summaries.push(summary);
                on_chunk(index + 1, chunks.len());
            }
            Err(source) => return Err(SummarizeError { index, source }),
        }
    }

    Ok(summaries)
}

/// Join per-chunk summaries into the combined summary, in chunk order.
/// Lossy and non-invertible by design.
pub fn combine_summaries(summaries: &[String]) -> String {
    summaries
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use llm_client::MockProvider;

    fn chunks(words: &[&str]) -> Vec<String> {
        words
            .iter()
            .map(|w| format!("{} filler text for the chunk", w))
            .collect()
    }

    #[tokio::test]
    async fn test_count_and_order_preserved() {
        let provider = MockProvider::echo_first_word();
        let input = chunks(&["alpha", "beta", "gamma"]);

        let summaries = summarize_chunks(&provider, &input, SummaryBounds::default(), |_, _| {})
            .await
            .unwrap();

        assert_eq!(summaries, vec!["alpha", "beta", "gamma"]);
    }

    #[tokio::test]
    async fn test_empty_chunk_list() {
        let provider = MockProvider::echo_first_word();

        let summaries =
            summarize_chunks(&provider, &[], SummaryBounds::default(), |_, _| {})
                .await
                .unwrap();

        assert!(summaries.is_empty());
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn test_failure_carries_chunk_index() {
        let provider = MockProvider::fails_on_call(
            1,
            LlmError::ApiError {
                message: "boom".to_string(),
                status_code: Some(500),
            },
        );
        let input = chunks(&["alpha", "beta", "gamma"]);

        let err = summarize_chunks(&provider, &input, SummaryBounds::default(), |_, _| {})
            .await
            .unwrap_err();

        assert_eq!(err.index, 1);
        // Later chunks are never attempted once the request is doomed
        assert_eq!(provider.call_count(), 2);
    }

    #[tokio::test]
    async fn test_progress_callback_counts_up() {
        let provider = MockProvider::echo_first_word();
        let input = chunks(&["alpha", "beta"]);

        let mut seen = Vec::new();
        summarize_chunks(&provider, &input, SummaryBounds::default(), |done, total| {
            seen.push((done, total));
        })
        .await
        .unwrap();

        assert_eq!(seen, vec![(1, 2), (2, 2)]);
    }

    #[test]
    fn test_combine_summaries_in_order() {
        let summaries = vec![
            "First part.".to_string(),
            "  Second part. ".to_string(),
            "Third part.".to_string(),
        ];
        assert_eq!(
            combine_summaries(&summaries),
            "First part. Second part. Third part."
        );
    }

    #[test]
    fn test_combine_skips_empty_summaries() {
        let summaries = vec!["One.".to_string(), "  ".to_string(), "Two.".to_string()];
        assert_eq!(combine_summaries(&summaries), "One. Two.");
    }
}
