//! Text chunking for length-bounded summarization requests.
//!
//! The summarization service accepts a bounded input, so arbitrary-length
//! documents are split into an ordered sequence of chunks first. Splitting
//! is greedy and deterministic: units (words or sentences) accumulate into
//! a buffer that is flushed just before it would overflow the size bound.
//! Units are never broken apart; a single unit longer than the bound
//! becomes its own oversized chunk.

use thiserror::Error;

/// Default chunk size bound in characters.
pub const DEFAULT_CHUNK_SIZE: usize = 1024;

/// The unit the chunker accumulates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkMode {
    /// Whitespace-delimited words
    Words,
    /// Sentences delimited by `.`, `?`, `!`
    Sentences,
}

impl ChunkMode {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "words" | "word" => Some(Self::Words),
            "sentences" | "sentence" => Some(Self::Sentences),
            _ => None,
        }
    }
}

/// The size bound must be positive.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("chunk size must be greater than zero")]
pub struct InvalidChunkSize;

/// Split text into chunks of whitespace-delimited words.
///
/// Every chunk's character count stays within `chunk_size`, except when a
/// single word alone exceeds the bound; that word becomes its own chunk.
/// Joining the chunks with single spaces reproduces the input's word
/// sequence with whitespace normalized.
pub fn chunk_words(text: &str, chunk_size: usize) -> Result<Vec<String>, InvalidChunkSize> {
    if chunk_size == 0 {
        return Err(InvalidChunkSize);
    }

    Ok(pack_units(text.split_whitespace(), chunk_size))
}

/// Split text into chunks of whole sentences.
///
/// Sentence units end at `.`, `?`, or `!`; trailing text without a
/// terminator forms a final unit. A single sentence longer than
/// `chunk_size` becomes its own oversized chunk.
pub fn chunk_sentences(text: &str, chunk_size: usize) -> Result<Vec<String>, InvalidChunkSize> {
    if chunk_size == 0 {
        return Err(InvalidChunkSize);
    }

    let sentences = split_sentences(text);
    Ok(pack_units(sentences.iter().map(String::as_str), chunk_size))
}

/// Split with the given mode.
pub fn chunk(
    text: &str,
    chunk_size: usize,
    mode: ChunkMode,
) -> Result<Vec<String>, InvalidChunkSize> {
    match mode {
        ChunkMode::Words => chunk_words(text, chunk_size),
        ChunkMode::Sentences => chunk_sentences(text, chunk_size),
    }
}

/// Greedily pack units into chunks bounded by `chunk_size` characters.
fn pack_units<'a>(units: impl Iterator<Item = &'a str>, chunk_size: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0usize;

    for unit in units {
        let unit_len = unit.chars().count();

        if current.is_empty() {
            // An oversized unit lands here alone and is flushed by the
            // next iteration, forming its own chunk.
            current.push_str(unit);
            current_len = unit_len;
        } else if current_len + 1 + unit_len <= chunk_size {
            current.push(' ');
            current.push_str(unit);
            current_len += 1 + unit_len;
        } else {
            chunks.push(std::mem::take(&mut current));
            current.push_str(unit);
            current_len = unit_len;
        }
    }

    if !current.is_empty() {
        chunks.push(current);
    }

    chunks
}

/// Split text into sentence units, each normalized to single-space words.
///
/// A unit ends right after `.`, `?`, or `!`. Anything left over at the end
/// of the input becomes a final unit without a terminator.
pub(crate) fn split_sentences(text: &str) -> Vec<String> {
    let mut units = Vec::new();
    let mut buffer = String::new();

    for c in text.chars() {
        buffer.push(c);
        if matches!(c, '.' | '?' | '!') {
            let unit = super::normalize_whitespace(&buffer);
            if !unit.is_empty() {
                units.push(unit);
            }
            buffer.clear();
        }
    }

    let tail = super::normalize_whitespace(&buffer);
    if !tail.is_empty() {
        units.push(tail);
    }

    units
}
