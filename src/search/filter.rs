//! Post-retrieval filters. Both keep the incoming order.

use crate::models::ScoredChunk;

/// Drop results scoring below `threshold`.
pub fn apply_threshold(results: Vec<ScoredChunk>, threshold: f32) -> Vec<ScoredChunk> {
    results
        .into_iter()
        .filter(|r| r.similarity >= threshold)
        .collect()
}

/// True when `content` contains at least one whitespace-separated query
/// token, both sides lowercased. Substring match, so "dog" matches "dogs".
pub fn contains_query_word(content: &str, query: &str) -> bool {
    let text = content.to_lowercase();
    query
        .to_lowercase()
        .split_whitespace()
        .any(|word| text.contains(word))
}

/// Lexical sanity check: drop results sharing no token with the query.
pub fn apply_keyword_filter(results: Vec<ScoredChunk>, query: &str) -> Vec<ScoredChunk> {
    results
        .into_iter()
        .filter(|r| contains_query_word(&r.content, query))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hit(content: &str, similarity: f32) -> ScoredChunk {
        ScoredChunk {
            filename: "post.md".to_string(),
            content: content.to_string(),
            similarity,
        }
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let kept = apply_threshold(vec![hit("a", 0.9), hit("b", 0.65), hit("c", 0.64)], 0.65);
        let contents: Vec<&str> = kept.iter().map(|r| r.content.as_str()).collect();
        assert_eq!(contents, vec!["a", "b"]);
    }

    #[test]
    fn test_threshold_zero_keeps_non_negative() {
        let kept = apply_threshold(vec![hit("a", 0.0), hit("b", -0.2)], 0.0);
        assert_eq!(kept.len(), 1);
    }

    #[test]
    fn test_contains_query_word_case_insensitive() {
        assert!(contains_query_word("Dogs are loyal companions.", "tell me about DOGS"));
        assert!(!contains_query_word("Fish live in water.", "dogs cats"));
    }

    #[test]
    fn test_blank_query_matches_nothing() {
        assert!(!contains_query_word("anything at all", "   "));
    }

    #[test]
    fn test_keyword_filter_preserves_order() {
        let results = vec![hit("rust ownership", 0.9), hit("python", 0.8), hit("rust traits", 0.7)];
        let kept = apply_keyword_filter(results, "Rust");
        assert_eq!(kept.len(), 2);
        assert_eq!(kept[0].content, "rust ownership");
        assert_eq!(kept[1].content, "rust traits");
    }
}
