use scoring::provider::{classic_idf, Hits};
use scoring::weighting::{Bm25F, Cosine, Frequency, Pl2, TfIdf};
use scoring::{
    Bm25Params, DocId, DocMeta, MemoryIndex, Pl2Params, ScoringConfig, StatsProvider, TermVector, Weighting,
    WeightingKind, Weightings,
};

/// Statistics with a single known term and hand-picked numbers.
struct FixedStats {
    docs: u32,
    df: u32,
}

impl StatsProvider for FixedStats {
    fn doc_count(&self) -> u32 {
        self.docs
    }
    fn doc_frequency(&self, _field: &str, term: &str) -> u32 {
        if term == "known" { self.df } else { 0 }
    }
    fn collection_frequency(&self, field: &str, term: &str) -> u64 {
        self.doc_frequency(field, term) as u64 * 2
    }
    fn field_length(&self, _doc: DocId, _field: &str) -> u32 {
        10
    }
    fn avg_field_length(&self, _field: &str) -> f64 {
        10.0
    }
    fn lexicon(&self, _field: &str) -> Vec<String> {
        vec!["known".into()]
    }
    fn document(&self, _doc: DocId) -> Option<DocMeta> {
        None
    }
    fn find_document(&self, _external_id: &str) -> Option<DocId> {
        None
    }
    fn term_vector(&self, _doc: DocId, _field: &str) -> scoring::Result<TermVector> {
        Ok(TermVector::new())
    }
    fn search(&self, _: &str, _: &str, _: &dyn Weighting, _: usize) -> scoring::Result<Hits> {
        Ok(Hits::default())
    }
}

/// Overrides the delegated models to prove the weighting routes through them.
struct CustomModels;

impl StatsProvider for CustomModels {
    fn doc_count(&self) -> u32 { 1 }
    fn doc_frequency(&self, _: &str, _: &str) -> u32 { 1 }
    fn collection_frequency(&self, _: &str, _: &str) -> u64 { 1 }
    fn field_length(&self, _: DocId, _: &str) -> u32 { 1 }
    fn avg_field_length(&self, _: &str) -> f64 { 1.0 }
    fn lexicon(&self, _: &str) -> Vec<String> { Vec::new() }
    fn document(&self, _: DocId) -> Option<DocMeta> { None }
    fn find_document(&self, _: &str) -> Option<DocId> { None }
    fn term_vector(&self, _: DocId, _: &str) -> scoring::Result<TermVector> { Ok(TermVector::new()) }
    fn search(&self, _: &str, _: &str, _: &dyn Weighting, _: usize) -> scoring::Result<Hits> { Ok(Hits::default()) }

    fn bm25f(&self, params: &Bm25Params, _: &str, _: &str, _: DocId, weight: u32) -> f64 {
        params.k1 * 1000.0 + weight as f64
    }

    fn pl2(&self, params: &Pl2Params, _: &str, _: &str, _: DocId, weight: u32, qtf: u32) -> f64 {
        params.c * 100.0 + (weight * qtf) as f64
    }
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

#[test]
fn frequency_is_the_raw_count() {
    let stats = FixedStats { docs: 10, df: 2 };
    for tf in [0, 1, 7, 12_345] {
        assert_eq!(Frequency.score(&stats, "content", "known", 0, tf, 3), tf as f64);
        assert_eq!(Frequency.score(&stats, "content", "absent", 0, tf, 1), tf as f64);
    }
}

#[test]
fn tf_idf_multiplies_by_idf() {
    let stats = FixedStats { docs: 10, df: 2 };
    let idf = (10.0f64 / 2.0).ln();
    assert!(close(stats.idf("content", "known"), idf));
    for tf in [0u32, 1, 4, 9] {
        assert!(close(TfIdf.score(&stats, "content", "known", 0, tf, 1), tf as f64 * idf));
    }
}

#[test]
fn tf_idf_absent_term_scores_zero() {
    let stats = FixedStats { docs: 10, df: 0 };
    assert_eq!(TfIdf.score(&stats, "content", "known", 0, 5, 1), 0.0);
    assert_eq!(TfIdf.score(&stats, "content", "absent", 0, 5, 1), 0.0);
    assert_eq!(classic_idf(0, 0), 0.0);
}

#[test]
fn cosine_matches_vector_space_formula() {
    let stats = FixedStats { docs: 8, df: 2 };
    let idf = 4f64.ln();
    for (tf, qtf) in [(1u32, 1u32), (3, 1), (2, 2), (10, 5)] {
        let dtw = (1.0 + (tf as f64).ln()) * idf;
        let qtw = (0.5 + 0.5 * qtf as f64) * idf;
        assert!(close(Cosine.score(&stats, "content", "known", 0, tf, qtf), dtw * qtw));
    }
}

#[test]
fn cosine_zero_tf_never_faults() {
    for df in [0, 1, 8] {
        let stats = FixedStats { docs: 8, df };
        for qtf in [0, 1, 3] {
            assert_eq!(Cosine.score(&stats, "content", "known", 0, 0, qtf), 0.0);
        }
    }
}

#[test]
fn cosine_absent_term_scores_zero() {
    let stats = FixedStats { docs: 8, df: 2 };
    assert_eq!(Cosine.score(&stats, "content", "absent", 0, 4, 1), 0.0);
}

#[test]
fn delegated_models_route_through_provider() {
    let stats = CustomModels;
    let bm25 = Bm25F { params: Bm25Params { k1: 2.0, ..Bm25Params::default() } };
    assert_eq!(bm25.score(&stats, "content", "t", 0, 3, 1), 2003.0);
    let pl2 = Pl2 { params: Pl2Params { c: 7.0 } };
    assert_eq!(pl2.score(&stats, "content", "t", 0, 3, 2), 706.0);
}

#[test]
fn default_bm25_on_memory_index() {
    let mut b = MemoryIndex::builder();
    let meta = |id: &str| DocMeta { external_id: id.into(), title: id.into(), path: None };
    b.add_document(meta("a"), &[("content", "whale whale sea")]);
    b.add_document(meta("b"), &[("content", "sea sky")]);
    b.add_document(meta("c"), &[("content", "sky land sun")]);
    let index = b.build();

    let w = Weightings::new(&ScoringConfig::default());
    let score = w.get(WeightingKind::Bm25F).score(&index, "content", "whale", 0, 2, 1);
    // N = 3, df = 1, dl = 3, avgdl = 8 / 3
    let idf = (1.0f64 + 2.5 / 1.5).ln();
    let tf = 2.0 / (0.25 + 0.75 * 3.0 / (8.0 / 3.0));
    assert!(close(score, idf * tf * 2.2 / (tf + 1.2)));
    assert_eq!(w.get(WeightingKind::Bm25F).score(&index, "content", "absent", 0, 0, 1), 0.0);
}

#[test]
fn field_b_override_changes_length_normalization() {
    let mut b = MemoryIndex::builder();
    let meta = |id: &str| DocMeta { external_id: id.into(), title: id.into(), path: None };
    b.add_document(meta("a"), &[("title", "whale of a long title here")]);
    b.add_document(meta("b"), &[("title", "sea")]);
    let index = b.build();

    let mut params = Bm25Params::default();
    let normalized = Bm25F { params: params.clone() }.score(&index, "title", "whale", 0, 1, 1);
    params.field_b.insert("title".into(), 0.0);
    let flat = Bm25F { params }.score(&index, "title", "whale", 0, 1, 1);
    // a long title is penalized only when b > 0
    assert!(flat > normalized);
}

#[test]
fn pl2_on_memory_index_is_finite() {
    let mut b = MemoryIndex::builder();
    let meta = |id: &str| DocMeta { external_id: id.into(), title: id.into(), path: None };
    b.add_document(meta("a"), &[("content", "whale whale sea")]);
    b.add_document(meta("b"), &[("content", "sea sky")]);
    let index = b.build();
    let w = Weightings::default();
    let s = w.get(WeightingKind::Pl2).score(&index, "content", "whale", 0, 2, 1);
    assert!(s.is_finite());
    assert!(s > 0.0);
}
