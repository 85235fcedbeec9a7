use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashSet;

use crate::stemmer;

lazy_static! {
    // A surface token is a maximal run of ASCII letters; apostrophes are
    // allowed once the run has started ("don't" is one token, a leading
    // apostrophe is a separator). Matching happens on the lowercased input,
    // so the pattern only needs the lowercase range.
    static ref TOKEN_RE: Regex = Regex::new(r"[a-z][a-z']*").expect("valid regex");
    static ref STOP_WORDS: HashSet<&'static str> = {
        let words: &[&str] = &[
            "a", "an", "and", "are", "as", "at", "be", "by", "for", "from",
            "has", "he", "in", "is", "it", "its", "of", "on", "that", "the",
            "to", "was", "were", "will", "with", "this", "but", "they", "have",
            "had", "what", "when", "where", "who", "which", "why", "how", "all",
            "each", "every", "both", "few", "more", "most", "other", "some", "such",
            "no", "nor", "not", "only", "own", "same", "so", "than", "too", "very",
            "can", "just", "should", "now",
            "you", "your", "we", "our", "us", "or", "if", "do", "did", "does",
            "about", "up", "out", "would", "could", "may", "might", "been",
            "also", "into", "over", "after", "before", "through", "between",
            "her", "him", "his", "she", "them", "their", "my", "me",
            "any", "there", "then", "these", "those", "am", "being",
            "here", "while", "during", "under", "again", "once",
        ];
        words.iter().copied().collect()
    };
}

pub fn is_stop_word(token: &str) -> bool {
    STOP_WORDS.contains(token)
}

/// Split text into surface tokens: ASCII-lowercased letter runs of length
/// >= 2 with stop words removed. This count is what a document's stored
/// length refers to; stemming happens afterwards and does not change it.
pub fn tokenize(text: &str) -> Vec<String> {
    let lowered = text.to_ascii_lowercase();
    let mut tokens = Vec::new();
    for mat in TOKEN_RE.find_iter(&lowered) {
        let token = mat.as_str();
        if token.len() < 2 || is_stop_word(token) {
            continue;
        }
        tokens.push(token.to_string());
    }
    tokens
}

/// Full analysis pipeline: tokenize, then Porter-stem each surface token.
/// Returns `(surface_token, stem)` pairs in document order.
pub fn analyze(text: &str) -> Vec<(String, String)> {
    tokenize(text)
        .into_iter()
        .map(|token| {
            let stem = stemmer::stem(&token);
            (token, stem)
        })
        .collect()
}
