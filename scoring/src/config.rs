use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Okapi BM25 parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Bm25Params {
    /// Term-frequency saturation.
    pub k1: f64,
    /// Length normalization.
    pub b: f64,
    /// Per-field overrides of `b`.
    pub field_b: HashMap<String, f64>,
}

impl Default for Bm25Params {
    fn default() -> Self {
        Self { k1: 1.2, b: 0.75, field_b: HashMap::new() }
    }
}

impl Bm25Params {
    pub fn b_for(&self, field: &str) -> f64 {
        self.field_b.get(field).copied().unwrap_or(self.b)
    }
}

/// DFR PL2 parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Pl2Params {
    /// Term-frequency normalization 2 hyper-parameter.
    pub c: f64,
}

impl Default for Pl2Params {
    fn default() -> Self {
        Self { c: 1.0 }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub bm25: Bm25Params,
    pub pl2: Pl2Params,
}
