//! Document chunking: sentence split, then fixed-size sentence groups.

pub mod sentence;

/// Sentences per chunk when the caller has no preference.
pub const DEFAULT_GROUP_SIZE: usize = 3;

/// Chunks whose trimmed length is at or below this many chars are dropped.
pub const MIN_CHUNK_CHARS: usize = 10;

/// Chunk a document into groups of `group_size` consecutive sentences.
///
/// Groups never overlap and come back in document order. Each chunk is the
/// group joined with a single space and trimmed; chunks of
/// [`MIN_CHUNK_CHARS`] chars or fewer are discarded. Empty input yields no
/// chunks. A `group_size` of 0 is treated as 1.
pub fn chunk_text(text: &str, group_size: usize) -> Vec<String> {
    if text.trim().is_empty() {
        return Vec::new();
    }

    let group_size = group_size.max(1);
    let sentences = sentence::split_sentences(text);

    sentences
        .chunks(group_size)
        .map(|group| group.join(" ").trim().to_string())
        .filter(|chunk| chunk.chars().count() > MIN_CHUNK_CHARS)
        .collect()
}
