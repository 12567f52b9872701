//! Trigram-set similarity for typo-tolerant suggestion matching, following
//! pg_trgm conventions: each word is lower-cased, padded with two leading and
//! one trailing blank, and similarity is shared-trigrams over the union.

use std::collections::HashSet;

/// Candidates below this similarity are not considered fuzzy matches.
/// Matches the pg_trgm default threshold.
pub const SIMILARITY_THRESHOLD: f32 = 0.3;

/// Extract the padded trigram set of a string.
pub fn trigrams(text: &str) -> HashSet<String> {
    let mut grams = HashSet::new();
    let lowered = text.to_lowercase();
    for word in lowered
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
    {
        let padded: Vec<char> = format!("  {} ", word).chars().collect();
        for window in padded.windows(3) {
            grams.insert(window.iter().collect());
        }
    }
    grams
}

/// Jaccard similarity of the two trigram sets, in `[0.0, 1.0]`.
/// Either side having no trigrams yields 0.0.
pub fn similarity(a: &str, b: &str) -> f32 {
    let ta = trigrams(a);
    let tb = trigrams(b);
    if ta.is_empty() || tb.is_empty() {
        return 0.0;
    }

    let shared = ta.intersection(&tb).count();
    let union = ta.len() + tb.len() - shared;
    shared as f32 / union as f32
}
