use super::{value_as_text, CriticScore, Evaluate};
use crate::error::CriticError;
use crate::text::tfidf_cosine_similarity;
use serde_json::Value;

/// Fuzzy text critic based on TF-IDF cosine similarity
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimilarityCritic {
    pub similarity_threshold: f64,
    pub stemming: bool,
}

impl Default for SimilarityCritic {
    fn default() -> Self {
        Self {
            similarity_threshold: 0.75,
            stemming: false,
        }
    }
}

impl SimilarityCritic {
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.similarity_threshold = threshold;
        self
    }

    pub fn with_stemming(mut self, stemming: bool) -> Self {
        self.stemming = stemming;
        self
    }
}

impl Evaluate for SimilarityCritic {
    fn evaluate(
        &self,
        expected: &Value,
        actual: &Value,
        weight: f64,
    ) -> Result<CriticScore, CriticError> {
        let similarity = tfidf_cosine_similarity(
            &value_as_text(expected),
            &value_as_text(actual),
            self.stemming,
        );
        Ok(CriticScore {
            matched: similarity >= self.similarity_threshold,
            score: (similarity * weight).min(weight),
        })
    }
}
