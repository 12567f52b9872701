//! Cache key construction.
//!
//! A key is a pure function of the operation kind and the normalized term,
//! so case and whitespace variants of the same query share one cache entry.

pub const RESULTS_PREFIX: &str = "search:results:";
pub const SUGGESTIONS_PREFIX: &str = "search:suggestions:";

/// Canonical form of a user-supplied search term: trimmed, then lower-cased.
/// Interior whitespace and punctuation are kept as typed.
pub fn normalize_term(term: &str) -> String {
    term.trim().to_lowercase()
}

/// Key for a cached product result set.
pub fn results_key(normalized_term: &str) -> String {
    format!("{}{}", RESULTS_PREFIX, normalized_term)
}

/// Key for a cached suggestion list.
pub fn suggestions_key(normalized_term: &str) -> String {
    format!("{}{}", SUGGESTIONS_PREFIX, normalized_term)
}
