use crate::config::{Bm25Params, Pl2Params};
use crate::error::Result;
use crate::similarity::TermVector;
use crate::weighting::Weighting;
use crate::{DocId, DocMeta};
use std::f64::consts::{LOG2_E, PI};

/// A matching document returned by [`StatsProvider::search`].
#[derive(Debug, Clone, PartialEq)]
pub struct Hit {
    pub doc_id: DocId,
    pub score: f64,
    pub meta: DocMeta,
}

/// Matches found for a query, best first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Hits {
    /// Number of matching documents before the limit was applied.
    pub total: usize,
    pub hits: Vec<Hit>,
}

/// Read-only term and document statistics of one index snapshot.
///
/// Lookups for terms outside the lexicon return 0 rather than failing.
/// `bm25f` and `pl2` carry default formulas over the raw statistics; an
/// index with its own implementation overrides them.
pub trait StatsProvider: Send + Sync {
    fn doc_count(&self) -> u32;

    /// Number of documents containing `term` in `field`.
    fn doc_frequency(&self, field: &str, term: &str) -> u32;

    /// Total occurrences of `term` in `field` over all documents.
    fn collection_frequency(&self, field: &str, term: &str) -> u64;

    /// Number of terms in the document's `field`.
    fn field_length(&self, doc: DocId, field: &str) -> u32;

    fn avg_field_length(&self, field: &str) -> f64;

    /// Distinct terms of `field`, in ascending order.
    fn lexicon(&self, field: &str) -> Vec<String>;

    fn document(&self, doc: DocId) -> Option<DocMeta>;

    fn find_document(&self, external_id: &str) -> Option<DocId>;

    /// Raw term frequencies of the document's `field`.
    fn term_vector(&self, doc: DocId, field: &str) -> Result<TermVector>;

    /// Runs `query` against `field`, scoring every matching document with
    /// `weighting`, and returns at most `limit` hits.
    fn search(&self, field: &str, query: &str, weighting: &dyn Weighting, limit: usize) -> Result<Hits>;

    fn idf(&self, field: &str, term: &str) -> f64 {
        classic_idf(self.doc_count(), self.doc_frequency(field, term))
    }

    fn bm25f(&self, params: &Bm25Params, field: &str, term: &str, doc: DocId, weight: u32) -> f64 {
        let idf = bm25_idf(self.doc_count(), self.doc_frequency(field, term));
        bm25(params.k1, params.b_for(field), idf, weight, self.field_length(doc, field), self.avg_field_length(field))
    }

    fn pl2(&self, params: &Pl2Params, field: &str, term: &str, doc: DocId, weight: u32, qtf: u32) -> f64 {
        let n = self.doc_count();
        if n == 0 {
            return 0.0;
        }
        let lambda = self.collection_frequency(field, term) as f64 / n as f64;
        pl2(params.c, lambda, weight, self.field_length(doc, field), self.avg_field_length(field), qtf)
    }
}

/// `ln(N / df)`, or 0 when the term is absent.
pub fn classic_idf(num_docs: u32, doc_frequency: u32) -> f64 {
    if num_docs == 0 || doc_frequency == 0 {
        return 0.0;
    }
    (num_docs as f64 / doc_frequency as f64).ln()
}

/// BM25 idf `ln(1 + (N - df + 0.5) / (df + 0.5))`, positive for every term
/// in the lexicon and 0 for absent ones.
pub fn bm25_idf(num_docs: u32, doc_frequency: u32) -> f64 {
    if num_docs == 0 || doc_frequency == 0 {
        return 0.0;
    }
    let n = num_docs as f64;
    let df = doc_frequency.min(num_docs) as f64;
    (1.0 + (n - df + 0.5) / (df + 0.5)).ln()
}

/// Okapi BM25 term score.
pub fn bm25(k1: f64, b: f64, idf: f64, tf: u32, doc_len: u32, avg_len: f64) -> f64 {
    if tf == 0 || idf == 0.0 || avg_len <= 0.0 {
        return 0.0;
    }
    let norm = (1.0 - b) + b * (doc_len as f64 / avg_len);
    let w = tf as f64 / norm;
    idf * (w * (k1 + 1.0)) / (w + k1)
}

/// Poisson DFR model with Laplace after-effect and normalization 2.
pub fn pl2(c: f64, lambda: f64, tf: u32, doc_len: u32, avg_len: f64, qtf: u32) -> f64 {
    if tf == 0 || doc_len == 0 || lambda <= 0.0 {
        return 0.0;
    }
    let tfn = tf as f64 * (1.0 + c * avg_len / doc_len as f64).log2();
    // c <= 0 or an empty field average leaves no normalized frequency
    if !tfn.is_finite() || tfn <= 0.0 {
        return 0.0;
    }
    let norm = 1.0 / (tfn + 1.0);
    norm * qtf as f64
        * (tfn * (1.0 / lambda).log2()
            + lambda * LOG2_E
            + 0.5 * (2.0 * PI * tfn).log2()
            + tfn * (tfn.log2() - LOG2_E))
}
