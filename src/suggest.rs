//! Near-miss suggestions when a contact cannot be found.
//!
//! Ranks the names visible on screen by similarity to what the operator typed.
//! Suggestions are only shown; they never choose a contact.
//!
//! CHANGELOG:
//! - 10/18/2026 - Initial implementation

use serde::Serialize;
use strsim::{jaro_winkler, normalized_levenshtein, sorensen_dice};

/// Minimum score for a name to be suggested (0.0 - 1.0).
pub const SUGGESTION_THRESHOLD: f64 = 0.7;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Suggestion {
    pub name: String,
    pub score: f64,
    pub strategy: &'static str,
}

/// Best score across several similarity measures.
pub fn similarity(query: &str, name: &str) -> (f64, &'static str) {
    let query = query.trim().to_lowercase();
    let name = name.trim().to_lowercase();

    let strategies = [
        ("jaro_winkler", jaro_winkler(&query, &name)),
        ("sorensen_dice", sorensen_dice(&query, &name)),
        ("levenshtein", normalized_levenshtein(&query, &name)),
        ("token_sort", token_sort_ratio(&query, &name)),
    ];

    strategies
        .into_iter()
        .max_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
        .map(|(strategy, score)| (score, strategy))
        .unwrap_or((0.0, "none"))
}

/// Sort words before comparing, so "Doe John" matches "John Doe".
fn token_sort_ratio(a: &str, b: &str) -> f64 {
    let mut a_tokens: Vec<&str> = a.split_whitespace().collect();
    let mut b_tokens: Vec<&str> = b.split_whitespace().collect();
    a_tokens.sort_unstable();
    b_tokens.sort_unstable();
    jaro_winkler(&a_tokens.join(" "), &b_tokens.join(" "))
}

/// Up to `limit` names scoring at least [`SUGGESTION_THRESHOLD`], best first.
/// Exact matches are left out: those would have been found.
pub fn suggest<'a, I>(query: &str, names: I, limit: usize) -> Vec<Suggestion>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut ranked: Vec<Suggestion> = names
        .into_iter()
        .filter(|name| *name != query)
        .map(|name| {
            let (score, strategy) = similarity(query, name);
            Suggestion {
                name: name.to_string(),
                score,
                strategy,
            }
        })
        .filter(|s| s.score >= SUGGESTION_THRESHOLD)
        .collect();

    ranked.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
    ranked.truncate(limit);
    ranked
}
