//! Pure text-ranking logic for catalog search: tokenization, weighted
//! relevance scoring and suggestion ordering. No storage in this crate;
//! adapters scan their rows and feed them through these functions.

pub mod trigram;

use std::cmp::Ordering;

/// Weight of a query token matched in the product name.
pub const NAME_WEIGHT: f32 = 1.0;

/// Weight of a query token matched only in the description.
pub const DESCRIPTION_WEIGHT: f32 = 0.4;

/// Split text into lower-cased alphanumeric tokens.
pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(|w| w.to_string())
        .collect()
}

/// Relevance of a product against pre-tokenized query terms.
///
/// Every query token must match somewhere (prefix match against name or
/// description tokens); products missing a token score `None`. The score is
/// the per-token weight sum normalized by token count, so it stays in
/// `(0.0, 1.0]` with name matches ranking above description-only matches.
pub fn score_product(query_tokens: &[String], name: &str, description: &str) -> Option<f32> {
    if query_tokens.is_empty() {
        return None;
    }

    let name_tokens = tokenize(name);
    let description_tokens = tokenize(description);

    let mut total = 0.0f32;
    for token in query_tokens {
        let in_name = name_tokens.iter().any(|t| t.starts_with(token.as_str()));
        let in_description = description_tokens
            .iter()
            .any(|t| t.starts_with(token.as_str()));

        total += match (in_name, in_description) {
            (true, _) => NAME_WEIGHT,
            (false, true) => DESCRIPTION_WEIGHT,
            (false, false) => return None,
        };
    }

    Some(total / query_tokens.len() as f32)
}

/// A suggestion candidate before ordering: one distinct product name with
/// its similarity to the query and its historical search popularity.
#[derive(Clone, Debug)]
pub struct SuggestionCandidate {
    pub name: String,
    pub similarity: f32,
    pub popularity: u64,
}

/// Order candidates by similarity, then popularity, then name, capped at
/// `limit`.
pub fn rank_suggestions(
    mut candidates: Vec<SuggestionCandidate>,
    limit: usize,
) -> Vec<SuggestionCandidate> {
    candidates.sort_by(|a, b| {
        b.similarity
            .partial_cmp(&a.similarity)
            .unwrap_or(Ordering::Equal)
            .then_with(|| b.popularity.cmp(&a.popularity))
            .then_with(|| a.name.cmp(&b.name))
    });
    candidates.truncate(limit);
    candidates
}
