//! The weighting family: five ways to turn term statistics into a score.
//!
//! Every weighting is a stateless function of the statistics it reads from a
//! [`StatsProvider`], so one instance of each can be shared by all requests.

use crate::config::{Bm25Params, Pl2Params, ScoringConfig};
use crate::error::ScoringError;
use crate::provider::StatsProvider;
use crate::DocId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Scores one (term, document, field) occurrence.
///
/// `weight` is the raw term frequency in the document field, `qtf` the
/// term's frequency in the query (1 when the caller has none).
pub trait Weighting: Send + Sync + fmt::Debug {
    fn kind(&self) -> WeightingKind;

    fn score(&self, stats: &dyn StatsProvider, field: &str, term: &str, doc: DocId, weight: u32, qtf: u32) -> f64;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WeightingKind {
    Cosine,
    #[serde(rename = "PL2")]
    Pl2,
    #[serde(rename = "BM25F")]
    Bm25F,
    #[serde(rename = "TF_IDF")]
    TfIdf,
    Frequency,
}

impl WeightingKind {
    pub const ALL: [WeightingKind; 5] = [
        WeightingKind::Cosine,
        WeightingKind::Pl2,
        WeightingKind::Bm25F,
        WeightingKind::TfIdf,
        WeightingKind::Frequency,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            WeightingKind::Cosine => "Cosine",
            WeightingKind::Pl2 => "PL2",
            WeightingKind::Bm25F => "BM25F",
            WeightingKind::TfIdf => "TF_IDF",
            WeightingKind::Frequency => "Frequency",
        }
    }
}

impl fmt::Display for WeightingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WeightingKind {
    type Err = ScoringError;

    /// Keys are matched exactly; `"cosine"` or `" PL2"` are rejected.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        WeightingKind::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| ScoringError::UnsupportedScoring(s.to_string()))
    }
}

/// Raw count baseline.
#[derive(Debug, Clone, Copy, Default)]
pub struct Frequency;

impl Weighting for Frequency {
    fn kind(&self) -> WeightingKind {
        WeightingKind::Frequency
    }

    fn score(&self, _stats: &dyn StatsProvider, _field: &str, _term: &str, _doc: DocId, weight: u32, _qtf: u32) -> f64 {
        weight as f64
    }
}

/// `tf * ln(N / df)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TfIdf;

impl Weighting for TfIdf {
    fn kind(&self) -> WeightingKind {
        WeightingKind::TfIdf
    }

    fn score(&self, stats: &dyn StatsProvider, field: &str, term: &str, _doc: DocId, weight: u32, _qtf: u32) -> f64 {
        if weight == 0 {
            return 0.0;
        }
        weight as f64 * stats.idf(field, term)
    }
}

/// Okapi BM25, computed by the provider.
#[derive(Debug, Clone, Default)]
pub struct Bm25F {
    pub params: Bm25Params,
}

impl Weighting for Bm25F {
    fn kind(&self) -> WeightingKind {
        WeightingKind::Bm25F
    }

    fn score(&self, stats: &dyn StatsProvider, field: &str, term: &str, doc: DocId, weight: u32, _qtf: u32) -> f64 {
        stats.bm25f(&self.params, field, term, doc, weight)
    }
}

/// DFR PL2, computed by the provider.
#[derive(Debug, Clone, Default)]
pub struct Pl2 {
    pub params: Pl2Params,
}

impl Weighting for Pl2 {
    fn kind(&self) -> WeightingKind {
        WeightingKind::Pl2
    }

    fn score(&self, stats: &dyn StatsProvider, field: &str, term: &str, doc: DocId, weight: u32, qtf: u32) -> f64 {
        stats.pl2(&self.params, field, term, doc, weight, qtf)
    }
}

/// Cosine vector-space weighting after Terrier's `CosineSimilarity` model.
#[derive(Debug, Clone, Copy, Default)]
pub struct Cosine;

impl Cosine {
    /// Query normalization factor. Fixed at 1; the query length is not taken
    /// into account.
    pub const QUERY_MATCH_FACTOR: f64 = 1.0;

    pub fn term_score(weight: u32, qtf: u32, idf: f64) -> f64 {
        if weight == 0 {
            return 0.0;
        }
        let dtw = (1.0 + (weight as f64).ln()) * idf;
        let qtw = (0.5 + 0.5 * qtf as f64 / Self::QUERY_MATCH_FACTOR) * idf;
        dtw * qtw
    }
}

impl Weighting for Cosine {
    fn kind(&self) -> WeightingKind {
        WeightingKind::Cosine
    }

    fn score(&self, stats: &dyn StatsProvider, field: &str, term: &str, _doc: DocId, weight: u32, qtf: u32) -> f64 {
        if weight == 0 {
            return 0.0;
        }
        Self::term_score(weight, qtf, stats.idf(field, term))
    }
}

/// One shared instance of every weighting.
#[derive(Debug, Clone, Default)]
pub struct Weightings {
    cosine: Cosine,
    pl2: Pl2,
    bm25f: Bm25F,
    tf_idf: TfIdf,
    frequency: Frequency,
}

impl Weightings {
    pub fn new(config: &ScoringConfig) -> Self {
        Self {
            cosine: Cosine,
            pl2: Pl2 { params: config.pl2.clone() },
            bm25f: Bm25F { params: config.bm25.clone() },
            tf_idf: TfIdf,
            frequency: Frequency,
        }
    }

    pub fn get(&self, kind: WeightingKind) -> &dyn Weighting {
        match kind {
            WeightingKind::Cosine => &self.cosine,
            WeightingKind::Pl2 => &self.pl2,
            WeightingKind::Bm25F => &self.bm25f,
            WeightingKind::TfIdf => &self.tf_idf,
            WeightingKind::Frequency => &self.frequency,
        }
    }

    /// Looks a weighting up by its key.
    pub fn select(&self, key: &str) -> Result<&dyn Weighting, ScoringError> {
        Ok(self.get(key.parse()?))
    }
}
