//! Relevance scoring over term/document statistics.
//!
//! The crate ranks documents with one of five weighting models and compares
//! term-frequency vectors with cosine similarity. The index itself is a
//! collaborator reached through [`StatsProvider`]; [`MemoryIndex`] is the
//! in-memory implementation used by the server and the tests.

use serde::{Deserialize, Serialize};

pub mod cloud;
pub mod config;
pub mod error;
pub mod handle;
pub mod memory;
pub mod provider;
pub mod ranker;
pub mod similarity;
pub mod weighting;

pub use config::{Bm25Params, Pl2Params, ScoringConfig};
pub use error::{Result, ScoringError};
pub use handle::IndexHandle;
pub use memory::{MemoryIndex, MemoryIndexBuilder};
pub use provider::{Hit, StatsProvider};
pub use ranker::{Ranker, Ranking, ScoredResult};
pub use similarity::{cosine_similarity, TermVector};
pub use weighting::{Weighting, WeightingKind, Weightings};

pub type DocId = u32;

pub const TITLE_FIELD: &str = "title";
pub const CONTENT_FIELD: &str = "content";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocMeta {
    pub external_id: String,
    pub title: String,
    /// Location of the source text, e.g. `data/aggregated/0001.txt`
    pub path: Option<String>,
}
