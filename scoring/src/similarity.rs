//! Term-frequency vectors and cosine similarity between them.

use crate::error::Result;
use crate::provider::StatsProvider;
use crate::DocId;
use serde::Serialize;
use std::collections::HashMap;

/// Term multiset of a query string or a document field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct TermVector(HashMap<String, u32>);

impl TermVector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts whitespace-separated terms. Normalization happens upstream.
    pub fn from_text(text: &str) -> Self {
        let mut v = Self::new();
        for term in text.split_whitespace() {
            v.add(term, 1);
        }
        v
    }

    pub fn add(&mut self, term: &str, count: u32) {
        if count == 0 {
            return;
        }
        *self.0.entry(term.to_string()).or_insert(0) += count;
    }

    pub fn get(&self, term: &str) -> u32 {
        self.0.get(term).copied().unwrap_or(0)
    }

    /// Number of distinct terms.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> + '_ {
        self.0.iter().map(|(t, c)| (t.as_str(), *c))
    }

    fn sum_of_squares(&self) -> f64 {
        self.0.values().map(|&c| (c as f64) * (c as f64)).sum()
    }
}

impl<S: Into<String>> FromIterator<(S, u32)> for TermVector {
    fn from_iter<I: IntoIterator<Item = (S, u32)>>(iter: I) -> Self {
        let mut v = Self::new();
        for (term, count) in iter {
            let term: String = term.into();
            v.add(&term, count);
        }
        v
    }
}

/// Cosine of the angle between two term vectors.
///
/// Returns 0 when either vector has zero magnitude. Counts are not
/// normalized beforehand, so the result is only guaranteed to be in `[0, 1]`
/// up to floating point rounding.
pub fn cosine_similarity(a: &TermVector, b: &TermVector) -> f64 {
    // Walk the longer vector and probe the shorter one.
    let (x, y) = if a.len() < b.len() { (b, a) } else { (a, b) };
    let sum_x = x.sum_of_squares();
    let sum_y = y.sum_of_squares();
    if sum_x == 0.0 || sum_y == 0.0 {
        return 0.0;
    }
    let dot: f64 = x
        .iter()
        .filter_map(|(term, cx)| y.0.get(term).map(|&cy| cx as f64 * cy as f64))
        .sum();
    dot / (sum_x * sum_y).sqrt()
}

/// Raw term frequencies of a document field, as the Frequency weighting sees them.
pub fn document_vector(provider: &dyn StatsProvider, doc: DocId, field: &str) -> Result<TermVector> {
    provider.term_vector(doc, field)
}

/// Similarity between a free-text query and a document field.
pub fn query_document_similarity(provider: &dyn StatsProvider, doc: DocId, field: &str, query: &str) -> Result<f64> {
    let query_vec = TermVector::from_text(query);
    let doc_vec = document_vector(provider, doc, field)?;
    let score = cosine_similarity(&query_vec, &doc_vec);
    tracing::debug!(doc, field, score, "query/document cosine similarity");
    Ok(score)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_whitespace_terms() {
        let v = TermVector::from_text("the cat sat on the mat");
        assert_eq!(v.len(), 5);
        assert_eq!(v.get("the"), 2);
        assert_eq!(v.get("mat"), 1);
        assert_eq!(v.get("dog"), 0);
    }

    #[test]
    fn repeated_whitespace_is_not_a_term() {
        let v = TermVector::from_text("  a\t\tb  a\n");
        assert_eq!(v, [("a", 2), ("b", 1)].into_iter().collect());
    }

    #[test]
    fn zero_counts_are_dropped() {
        let v: TermVector = [("a", 0), ("b", 2)].into_iter().collect();
        assert_eq!(v.len(), 1);
    }

    #[test]
    fn disjoint_vectors_are_orthogonal() {
        let a = TermVector::from_text("red green");
        let b = TermVector::from_text("blue");
        assert_eq!(cosine_similarity(&a, &b), 0.0);
    }

    #[test]
    fn empty_vector_scores_zero() {
        let a = TermVector::new();
        let b = TermVector::from_text("x y");
        assert_eq!(cosine_similarity(&a, &b), 0.0);
        assert_eq!(cosine_similarity(&b, &a), 0.0);
        assert_eq!(cosine_similarity(&a, &a), 0.0);
    }
}
