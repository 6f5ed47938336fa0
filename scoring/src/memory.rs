//! In-memory per-field inverted index implementing [`StatsProvider`].
//!
//! Text handed to the builder is expected to be normalized already: terms are
//! separated by whitespace and compared byte for byte.

use crate::error::{Result, ScoringError};
use crate::provider::{Hit, Hits, StatsProvider};
use crate::similarity::TermVector;
use crate::weighting::Weighting;
use crate::{DocId, DocMeta};
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Posting {
    pub doc_id: DocId,
    pub tf: u32,
}

#[derive(Debug, Default)]
struct FieldIndex {
    postings: BTreeMap<String, Vec<Posting>>, // postings sorted by doc_id
    lengths: Vec<u32>,
    vectors: Vec<TermVector>,
    total_len: u64,
}

impl FieldIndex {
    fn grow_to(&mut self, num_docs: usize) {
        if self.lengths.len() < num_docs {
            self.lengths.resize(num_docs, 0);
            self.vectors.resize(num_docs, TermVector::new());
        }
    }
}

#[derive(Debug, Default)]
pub struct MemoryIndexBuilder {
    fields: HashMap<String, FieldIndex>,
    docs: Vec<DocMeta>,
    doc_id_map: HashMap<String, DocId>,
}

impl MemoryIndexBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains_document(&self, external_id: &str) -> bool {
        self.doc_id_map.contains_key(external_id)
    }

    /// Adds a document with its field texts and returns its id.
    ///
    /// A repeated external id stays searchable under both doc ids, but
    /// `find_document` resolves to the latest one.
    pub fn add_document(&mut self, meta: DocMeta, fields: &[(&str, &str)]) -> DocId {
        let doc_id = self.docs.len() as DocId;
        if let Some(previous) = self.doc_id_map.insert(meta.external_id.clone(), doc_id) {
            tracing::warn!(external_id = %meta.external_id, previous, doc_id, "duplicate external id");
        }
        self.docs.push(meta);

        // A field named twice is indexed as the concatenation of its texts.
        let mut per_field: BTreeMap<&str, TermVector> = BTreeMap::new();
        for (name, text) in fields {
            let vector = per_field.entry(*name).or_default();
            for term in text.split_whitespace() {
                vector.add(term, 1);
            }
        }

        for (name, vector) in per_field {
            let length: u32 = vector.iter().map(|(_, c)| c).sum();
            let field = self.fields.entry(name.to_string()).or_default();
            field.grow_to(doc_id as usize + 1);
            for (term, tf) in vector.iter() {
                field.postings.entry(term.to_string()).or_default().push(Posting { doc_id, tf });
            }
            field.lengths[doc_id as usize] = length;
            field.total_len += length as u64;
            field.vectors[doc_id as usize] = vector;
        }
        doc_id
    }

    pub fn build(mut self) -> MemoryIndex {
        let num_docs = self.docs.len();
        for field in self.fields.values_mut() {
            field.grow_to(num_docs);
        }
        tracing::debug!(num_docs, num_fields = self.fields.len(), "built memory index");
        MemoryIndex { fields: self.fields, docs: self.docs, doc_id_map: self.doc_id_map, closed: AtomicBool::new(false) }
    }
}

#[derive(Debug)]
pub struct MemoryIndex {
    fields: HashMap<String, FieldIndex>,
    docs: Vec<DocMeta>,
    doc_id_map: HashMap<String, DocId>,
    closed: AtomicBool,
}

impl MemoryIndex {
    pub fn builder() -> MemoryIndexBuilder {
        MemoryIndexBuilder::new()
    }

    /// Marks the snapshot unusable. Searches and vector lookups fail afterwards.
    pub fn close(&self) {
        if !self.closed.swap(true, Ordering::AcqRel) {
            tracing::info!(num_docs = self.docs.len(), "closed index snapshot");
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    fn ensure_open(&self) -> Result<()> {
        if self.is_closed() {
            tracing::warn!("request against a closed index snapshot");
            return Err(ScoringError::ProviderUnavailable);
        }
        Ok(())
    }

    fn postings(&self, field: &str, term: &str) -> &[Posting] {
        self.fields
            .get(field)
            .and_then(|f| f.postings.get(term))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

impl StatsProvider for MemoryIndex {
    fn doc_count(&self) -> u32 {
        self.docs.len() as u32
    }

    fn doc_frequency(&self, field: &str, term: &str) -> u32 {
        self.postings(field, term).len() as u32
    }

    fn collection_frequency(&self, field: &str, term: &str) -> u64 {
        self.postings(field, term).iter().map(|p| p.tf as u64).sum()
    }

    fn field_length(&self, doc: DocId, field: &str) -> u32 {
        self.fields
            .get(field)
            .and_then(|f| f.lengths.get(doc as usize))
            .copied()
            .unwrap_or(0)
    }

    fn avg_field_length(&self, field: &str) -> f64 {
        match self.fields.get(field) {
            Some(f) if !self.docs.is_empty() => f.total_len as f64 / self.docs.len() as f64,
            _ => 0.0,
        }
    }

    fn lexicon(&self, field: &str) -> Vec<String> {
        self.fields
            .get(field)
            .map(|f| f.postings.keys().cloned().collect())
            .unwrap_or_default()
    }

    fn document(&self, doc: DocId) -> Option<DocMeta> {
        self.docs.get(doc as usize).cloned()
    }

    fn find_document(&self, external_id: &str) -> Option<DocId> {
        self.doc_id_map.get(external_id).copied()
    }

    fn term_vector(&self, doc: DocId, field: &str) -> Result<TermVector> {
        self.ensure_open()?;
        if doc as usize >= self.docs.len() {
            return Err(ScoringError::UnknownDocument(doc.to_string()));
        }
        Ok(self
            .fields
            .get(field)
            .and_then(|f| f.vectors.get(doc as usize))
            .cloned()
            .unwrap_or_default())
    }

    fn search(&self, field: &str, query: &str, weighting: &dyn Weighting, limit: usize) -> Result<Hits> {
        self.ensure_open()?;
        let query_vec = TermVector::from_text(query);
        // Sorted terms keep the float summation order stable across runs.
        let mut terms: Vec<(&str, u32)> = query_vec.iter().collect();
        terms.sort_unstable_by(|a, b| a.0.cmp(b.0));

        let mut scores: BTreeMap<DocId, f64> = BTreeMap::new();
        for (term, qtf) in terms {
            for p in self.postings(field, term) {
                let s = weighting.score(self, field, term, p.doc_id, p.tf, qtf);
                *scores.entry(p.doc_id).or_insert(0.0) += s;
            }
        }

        let mut scored: Vec<(DocId, f64)> = scores.into_iter().collect();
        // stable sort: equal scores stay in doc_id order
        scored.sort_by(|a, b| b.1.total_cmp(&a.1));
        let total = scored.len();
        let hits = scored
            .into_iter()
            .take(limit)
            .filter_map(|(doc_id, score)| self.document(doc_id).map(|meta| Hit { doc_id, score, meta }))
            .collect();
        Ok(Hits { total, hits })
    }
}
