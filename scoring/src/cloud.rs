//! Aggregations feeding term clouds and lexicon views.

use crate::error::Result;
use crate::provider::StatsProvider;
use crate::ranker::{Ranker, ScoredResult};
use crate::similarity::TermVector;
use crate::weighting::WeightingKind;
use crate::{CONTENT_FIELD, TITLE_FIELD};
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WeightedTerm {
    pub term: String,
    pub weight: u32,
}

/// Heaviest terms first, ties in term order.
pub fn ranked_terms(vector: &TermVector, limit: usize) -> Vec<WeightedTerm> {
    let mut terms: Vec<(&str, u32)> = vector.iter().collect();
    terms.sort_unstable_by_key(|&(t, w)| (Reverse(w), t));
    terms
        .into_iter()
        .take(limit)
        .map(|(term, weight)| WeightedTerm { term: term.to_string(), weight })
        .collect()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LexiconSort {
    #[default]
    Term,
    FrequencyTitle,
    FrequencyContent,
}

impl FromStr for LexiconSort {
    type Err = std::convert::Infallible;

    /// Unrecognized values fall back to term order.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(match s {
            "frequency_title" => LexiconSort::FrequencyTitle,
            "frequency_content" => LexiconSort::FrequencyContent,
            _ => LexiconSort::Term,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LexiconRow {
    pub term: String,
    pub title_df: u32,
    pub content_df: u32,
}

/// Document frequencies in title and content for every term of `field`.
pub fn lexicon_table(provider: &dyn StatsProvider, field: &str, sort: LexiconSort) -> Vec<LexiconRow> {
    let mut rows: Vec<LexiconRow> = provider
        .lexicon(field)
        .into_iter()
        .map(|term| LexiconRow {
            title_df: provider.doc_frequency(TITLE_FIELD, &term),
            content_df: provider.doc_frequency(CONTENT_FIELD, &term),
            term,
        })
        .collect();
    match sort {
        LexiconSort::Term => rows.sort_by(|a, b| a.term.cmp(&b.term)),
        LexiconSort::FrequencyTitle => rows.sort_by_key(|r| Reverse(r.title_df)),
        LexiconSort::FrequencyContent => rows.sort_by_key(|r| Reverse(r.content_df)),
    }
    rows
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TermStatistics {
    pub term: String,
    pub title_df: u32,
    pub content_df: u32,
    pub title_docs: Vec<ScoredResult>,
    pub content_docs: Vec<ScoredResult>,
}

/// Where `term` occurs, by field, ordered by raw frequency.
pub fn term_statistics<P: StatsProvider + ?Sized>(ranker: &Ranker<P>, term: &str) -> Result<TermStatistics> {
    let provider = ranker.provider();
    let title_df = provider.doc_frequency(TITLE_FIELD, term);
    let content_df = provider.doc_frequency(CONTENT_FIELD, term);
    let title = ranker.rank_with(term, TITLE_FIELD, WeightingKind::Frequency, title_df.max(1) as usize)?;
    let content = ranker.rank_with(term, CONTENT_FIELD, WeightingKind::Frequency, content_df.max(1) as usize)?;
    Ok(TermStatistics {
        term: term.to_string(),
        title_df,
        content_df,
        title_docs: title.results,
        content_docs: content.results,
    })
}
