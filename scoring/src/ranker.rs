use crate::error::Result;
use crate::provider::StatsProvider;
use crate::weighting::{WeightingKind, Weightings};
use crate::{DocId, DocMeta};
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredResult {
    pub doc_id: DocId,
    pub score: f64,
    #[serde(flatten)]
    pub meta: DocMeta,
}

/// Ranked answer to one query.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Ranking {
    /// Matching documents before truncation to the limit.
    pub total_hits: usize,
    pub results: Vec<ScoredResult>,
}

/// Dispatches queries to a provider with a chosen weighting bound in.
pub struct Ranker<P: ?Sized> {
    provider: Arc<P>,
    weightings: Arc<Weightings>,
}

impl<P: StatsProvider + ?Sized> Ranker<P> {
    pub fn new(provider: Arc<P>, weightings: Arc<Weightings>) -> Self {
        Self { provider, weightings }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Ranks `query` against `field` with the weighting named `key`.
    ///
    /// An unknown key fails before the provider is consulted.
    pub fn rank(&self, query: &str, field: &str, key: &str, limit: usize) -> Result<Ranking> {
        let kind: WeightingKind = key.parse()?;
        self.rank_with(query, field, kind, limit)
    }

    pub fn rank_with(&self, query: &str, field: &str, kind: WeightingKind, limit: usize) -> Result<Ranking> {
        let weighting = self.weightings.get(kind);
        let found = self.provider.search(field, query, weighting, limit)?;
        tracing::debug!(query, field, scoring = %kind, limit, total_hits = found.total, "ranked query");
        let results = found
            .hits
            .into_iter()
            .map(|h| ScoredResult { doc_id: h.doc_id, score: h.score, meta: h.meta })
            .collect();
        Ok(Ranking { total_hits: found.total, results })
    }
}
