//! Sentence splitting on terminal punctuation.
//!
//! A boundary is one of `.`, `!` or `?` immediately followed by whitespace.
//! The whitespace run is the separator and is dropped; the punctuation stays
//! with the sentence it ends. Runs such as `...` only split when whitespace
//! follows the last mark.

fn is_terminal(c: char) -> bool {
    matches!(c, '.' | '!' | '?')
}

/// Split `text` into sentences, discarding empty and whitespace-only pieces.
pub fn split_sentences(text: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut start = 0usize;
    let mut prev: Option<char> = None;
    let mut chars = text.char_indices().peekable();

    while let Some((idx, c)) = chars.next() {
        if c.is_whitespace() && prev.is_some_and(is_terminal) {
            push_sentence(&mut sentences, &text[start..idx]);

            // Swallow the rest of the whitespace run
            let mut end = idx + c.len_utf8();
            while let Some(&(next_idx, next)) = chars.peek() {
                if !next.is_whitespace() {
                    break;
                }
                end = next_idx + next.len_utf8();
                chars.next();
            }
            start = end;
            prev = None;
            continue;
        }
        prev = Some(c);
    }

    push_sentence(&mut sentences, &text[start..]);
    sentences
}

fn push_sentence<'a>(sentences: &mut Vec<&'a str>, candidate: &'a str) {
    if !candidate.trim().is_empty() {
        sentences.push(candidate);
    }
}
