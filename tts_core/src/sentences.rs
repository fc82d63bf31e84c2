//! Sentence splitting for incremental flushing over the socket.
//!
//! Sentences end at any run of `. ! ? 。 ！ ？ । ؟ ۔` and the whitespace that
//! follows it. Whatever trails the last terminator becomes the final segment.

use std::sync::OnceLock;

use regex::Regex;

static SENTENCE_RE: OnceLock<Regex> = OnceLock::new();

fn sentence_re() -> &'static Regex {
    SENTENCE_RE.get_or_init(|| {
        Regex::new(r"[^.!?。！？।؟۔]*[.!?。！？।؟۔]+\s*").expect("sentence pattern is valid")
    })
}

/// Splits `text` into trimmed, non-empty sentence-like segments.
pub fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut matched_end = 0;

    for m in sentence_re().find_iter(text) {
        let sentence = m.as_str().trim();
        if !sentence.is_empty() {
            sentences.push(sentence.to_string());
        }
        matched_end = m.end();
    }

    let remaining = text[matched_end..].trim();
    if !remaining.is_empty() {
        sentences.push(remaining.to_string());
    }
    sentences
}
