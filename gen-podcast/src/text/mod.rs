//! Text processing: chunking and synthesis-input sanitation.

pub mod chunker;

pub use chunker::{ChunkMode, InvalidChunkSize};

/// Collapse all whitespace runs into single spaces and trim the ends.
pub fn normalize_whitespace(text: &str) -> String {
    let mut result = String::with_capacity(text.len());

    for word in text.split_whitespace() {
        if !result.is_empty() {
            result.push(' ');
        }
        result.push_str(word);
    }

    result
}

/// Prepare summary text for the synthesis service: drop control
/// characters and collapse whitespace.
pub fn sanitize_for_synthesis(text: &str) -> String {
    // Newlines and tabs are control characters but still whitespace;
    // they are handled by normalization, not dropped.
    let stripped: String = text
        .chars()
        .filter(|c| !c.is_control() || c.is_whitespace())
        .collect();
    normalize_whitespace(&stripped)
}
