/// Errors surfaced by ranking and similarity calls.
///
/// Degenerate inputs (empty vectors, terms missing from the lexicon, zero
/// frequencies) are not errors: they score 0.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ScoringError {
    /// Weighting key outside `Cosine`, `PL2`, `BM25F`, `TF_IDF`, `Frequency`.
    #[error("unsupported scoring method: {0}")]
    UnsupportedScoring(String),
    /// The index snapshot was closed or replaced mid-request.
    #[error("index snapshot is closed")]
    ProviderUnavailable,
    /// No document with this id exists in the snapshot.
    #[error("unknown document: {0}")]
    UnknownDocument(String),
}

pub type Result<T> = std::result::Result<T, ScoringError>;
