//! Text processing for fuzzy comparison of free-text tool arguments

use rust_stemmers::{Algorithm, Stemmer};
use std::collections::{HashMap, HashSet};
use std::sync::OnceLock;

/// Common English stop words to filter out during tokenization
static STOP_WORDS: OnceLock<HashSet<&'static str>> = OnceLock::new();

/// Porter stemmer for English text
static STEMMER: OnceLock<Stemmer> = OnceLock::new();

fn get_stop_words() -> &'static HashSet<&'static str> {
    STOP_WORDS.get_or_init(|| {
        [
            "a", "an", "and", "are", "as", "at", "be", "but", "by", "for", "if", "in", "into",
            "is", "it", "no", "not", "of", "on", "or", "such", "that", "the", "their", "then",
            "there", "these", "they", "this", "to", "was", "will", "with",
        ]
        .iter()
        .copied()
        .collect()
    })
}

fn get_stemmer() -> &'static Stemmer {
    STEMMER.get_or_init(|| Stemmer::create(Algorithm::English))
}

/// Word tokenizer splitting on non-alphanumeric characters with stop word removal
pub fn tokenize(text: &str) -> Vec<String> {
    let stop_words = get_stop_words();
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|s| !s.is_empty())
        .filter(|s| !stop_words.contains(s))
        .map(|s| s.to_string())
        .collect()
}

/// Tokenize text with optional Porter stemming
pub fn tokenize_with_stemming(text: &str, stem: bool) -> Vec<String> {
    let tokens = tokenize(text);
    if !stem {
        return tokens;
    }

    let stemmer = get_stemmer();
    tokens.iter().map(|t| stemmer.stem(t).to_string()).collect()
}

fn term_counts(tokens: &[String]) -> HashMap<&str, f64> {
    let mut counts = HashMap::new();
    for token in tokens {
        *counts.entry(token.as_str()).or_insert(0.0) += 1.0;
    }
    counts
}

/// Cosine similarity of two texts under TF-IDF weighting fitted on the pair.
///
/// Uses smoothed idf `ln((1 + n) / (1 + df)) + 1` with `n = 2`, so terms
/// shared by both texts weigh less than terms unique to one of them.
/// Returns a value in [0.0, 1.0]; two texts without any tokens are treated
/// as identical only when both are empty after trimming.
pub fn tfidf_cosine_similarity(a: &str, b: &str, stem: bool) -> f64 {
    let tokens_a = tokenize_with_stemming(a, stem);
    let tokens_b = tokenize_with_stemming(b, stem);

    if tokens_a.is_empty() || tokens_b.is_empty() {
        return if a.trim() == b.trim() { 1.0 } else { 0.0 };
    }

    let tf_a = term_counts(&tokens_a);
    let tf_b = term_counts(&tokens_b);

    let idf = |term: &str| {
        let df = tf_a.contains_key(term) as u8 as f64 + tf_b.contains_key(term) as u8 as f64;
        ((1.0 + 2.0) / (1.0 + df)).ln() + 1.0
    };

    let norm = |tf: &HashMap<&str, f64>| {
        tf.iter()
            .map(|(term, count)| (count * idf(term)).powi(2))
            .sum::<f64>()
            .sqrt()
    };

    let dot: f64 = tf_a
        .iter()
        .filter_map(|(term, count_a)| {
            tf_b.get(term)
                .map(|count_b| count_a * idf(term) * count_b * idf(term))
        })
        .sum();

    let denominator = norm(&tf_a) * norm(&tf_b);
    if denominator == 0.0 {
        return 0.0;
    }
    (dot / denominator).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_removes_stop_words() {
        let tokens = tokenize("List the open issues in the backlog");
        assert_eq!(tokens, vec!["list", "open", "issues", "backlog"]);
    }

    #[test]
    fn test_tokenize_splits_on_punctuation() {
        let tokens = tokenize("project-key: ENG_42");
        assert_eq!(tokens, vec!["project", "key", "eng", "42"]);
    }

    #[test]
    fn test_tokenize_with_stemming_enabled() {
        let tokens = tokenize_with_stemming("issues issue sprints", true);
        assert_eq!(tokens, vec!["issu", "issu", "sprint"]);
    }

    #[test]
    fn test_identical_texts_are_fully_similar() {
        let score = tfidf_cosine_similarity("weekly sync notes", "weekly sync notes", false);
        assert!((score - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_disjoint_texts_have_zero_similarity() {
        let score = tfidf_cosine_similarity("weekly sync", "quarterly budget", false);
        assert_eq!(score, 0.0);
    }

    #[test]
    fn test_partial_overlap_is_between_bounds() {
        let score = tfidf_cosine_similarity(
            "fix login bug on mobile",
            "fix login bug on desktop",
            false,
        );
        assert!(score > 0.4 && score < 1.0, "score was {score}");
    }

    #[test]
    fn test_empty_texts() {
        assert_eq!(tfidf_cosine_similarity("", "", false), 1.0);
        assert_eq!(tfidf_cosine_similarity("", "something", false), 0.0);
    }
}
