use anyhow::Result;
use axum::{extract::{Query, State}, http::{HeaderMap, StatusCode}, routing::{get, post}, Json, Router};
use scoring::cloud::{lexicon_table, ranked_terms, term_statistics, LexiconRow, LexiconSort, TermStatistics, WeightedTerm};
use scoring::similarity::{document_vector, query_document_similarity};
use scoring::{
    cosine_similarity, IndexHandle, MemoryIndex, Ranker, ScoredResult, ScoringConfig, ScoringError, StatsProvider,
    WeightingKind, Weightings, CONTENT_FIELD, TITLE_FIELD,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub mod corpus;

type ApiResult<T> = Result<Json<T>, (StatusCode, String)>;

#[derive(Clone)]
pub struct AppState {
    pub corpus_path: PathBuf,
    pub handle: Arc<IndexHandle<MemoryIndex>>,
    pub weightings: Arc<Weightings>,
    pub admin_token: Option<String>,
}

impl AppState {
    pub fn load(corpus_path: impl Into<PathBuf>, scoring: &ScoringConfig, admin_token: Option<String>) -> Result<Self> {
        let corpus_path = corpus_path.into();
        let index = corpus::load_corpus(&corpus_path)?;
        Ok(Self {
            corpus_path,
            handle: Arc::new(IndexHandle::new(index)),
            weightings: Arc::new(Weightings::new(scoring)),
            admin_token,
        })
    }

    /// Current snapshot, or 503 once it has been closed.
    fn snapshot(&self) -> Result<Arc<MemoryIndex>, (StatusCode, String)> {
        let index = self.handle.snapshot();
        if index.is_closed() {
            return Err(error_response(ScoringError::ProviderUnavailable));
        }
        Ok(index)
    }

    fn ranker(&self) -> Result<Ranker<MemoryIndex>, (StatusCode, String)> {
        Ok(Ranker::new(self.snapshot()?, Arc::clone(&self.weightings)))
    }
}

pub fn build_app(corpus_path: impl Into<PathBuf>, scoring: &ScoringConfig) -> Result<Router> {
    let admin_token = std::env::var("ADMIN_TOKEN").ok();
    let state = AppState::load(corpus_path, scoring, admin_token)?;

    // CORS: read CORS_ALLOW_ORIGIN (comma-separated) or allow Any by default
    let cors = match std::env::var("CORS_ALLOW_ORIGIN") {
        Ok(val) => {
            let origins: Vec<_> = val.split(',').filter_map(|s| s.trim().parse().ok()).collect();
            if origins.is_empty() {
                CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any)
            } else {
                CorsLayer::new().allow_origin(AllowOrigin::list(origins)).allow_methods(Any).allow_headers(Any)
            }
        }
        Err(_) => CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any),
    };

    Ok(router(state).layer(cors).layer(TraceLayer::new_for_http()))
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/search", get(search_handler))
        .route("/display", get(display_handler))
        .route("/lexdisplay", get(lexicon_handler))
        .route("/termstat", get(termstat_handler))
        .route("/similarity", get(similarity_handler))
        .route("/index", post(reload_handler))
        .route("/close", post(close_handler))
        .with_state(state)
}

fn error_response(err: ScoringError) -> (StatusCode, String) {
    let status = match err {
        ScoringError::UnsupportedScoring(_) => StatusCode::BAD_REQUEST,
        ScoringError::UnknownDocument(_) => StatusCode::NOT_FOUND,
        ScoringError::ProviderUnavailable => StatusCode::SERVICE_UNAVAILABLE,
    };
    (status, err.to_string())
}

#[derive(Deserialize)]
pub struct SearchParams {
    pub query: String,
    #[serde(default = "default_number")]
    pub number: usize,
    #[serde(default = "default_scoring")]
    pub scoring: String,
    #[serde(default = "default_content_field")]
    pub field: String,
}
fn default_number() -> usize { 10 }
fn default_scoring() -> String { "BM25F".into() }
fn default_content_field() -> String { CONTENT_FIELD.into() }
fn default_title_field() -> String { TITLE_FIELD.into() }

#[derive(Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub max_hits: usize,
    pub scoring: String,
    pub field: String,
    pub took_s: f64,
    pub total_hits: usize,
    pub hits: usize,
    pub results: Vec<ScoredResult>,
}

pub async fn search_handler(State(state): State<AppState>, Query(params): Query<SearchParams>) -> ApiResult<SearchResponse> {
    let start = std::time::Instant::now();
    // a bad key is rejected before the snapshot is looked at
    let kind: WeightingKind = params.scoring.parse().map_err(error_response)?;
    let ranker = state.ranker()?;
    let ranking = ranker
        .rank_with(&params.query, &params.field, kind, params.number)
        .map_err(error_response)?;
    Ok(Json(SearchResponse {
        query: params.query,
        max_hits: params.number,
        scoring: params.scoring,
        field: params.field,
        took_s: start.elapsed().as_secs_f64(),
        total_hits: ranking.total_hits,
        hits: ranking.results.len(),
        results: ranking.results,
    }))
}

#[derive(Deserialize)]
pub struct DisplayParams {
    pub docid: String,
    #[serde(default = "default_cloud_words")]
    pub words: usize,
}
fn default_cloud_words() -> usize { 150 }

#[derive(Serialize)]
pub struct DisplayResponse {
    pub doc_id: u32,
    pub external_id: String,
    pub title: String,
    pub path: Option<String>,
    pub text: Option<String>,
    /// Content terms by frequency, for rendering a term cloud.
    pub cloud: Vec<WeightedTerm>,
}

pub async fn display_handler(State(state): State<AppState>, Query(params): Query<DisplayParams>) -> ApiResult<DisplayResponse> {
    let index = state.snapshot()?;
    let doc_id = index
        .find_document(&params.docid)
        .ok_or_else(|| error_response(ScoringError::UnknownDocument(params.docid.clone())))?;
    let meta = index
        .document(doc_id)
        .ok_or_else(|| error_response(ScoringError::UnknownDocument(params.docid.clone())))?;
    let vector = document_vector(&*index, doc_id, CONTENT_FIELD).map_err(error_response)?;
    let text = meta
        .path
        .as_ref()
        .and_then(|rel| std::fs::read_to_string(corpus::corpus_root(&state.corpus_path).join(rel)).ok());
    Ok(Json(DisplayResponse {
        doc_id,
        external_id: meta.external_id,
        title: meta.title,
        path: meta.path,
        text,
        cloud: ranked_terms(&vector, params.words),
    }))
}

#[derive(Deserialize)]
pub struct LexiconParams {
    #[serde(default = "default_title_field")]
    pub field: String,
    #[serde(default)]
    pub sort_by: String,
}

#[derive(Serialize)]
pub struct LexiconResponse {
    pub field: String,
    pub sort_by: LexiconSort,
    pub rows: Vec<LexiconRow>,
}

pub async fn lexicon_handler(State(state): State<AppState>, Query(params): Query<LexiconParams>) -> ApiResult<LexiconResponse> {
    let index = state.snapshot()?;
    let sort: LexiconSort = params.sort_by.parse().unwrap_or_default();
    let rows = lexicon_table(&*index, &params.field, sort);
    Ok(Json(LexiconResponse { field: params.field, sort_by: sort, rows }))
}

#[derive(Deserialize)]
pub struct TermParams {
    pub term: String,
}

pub async fn termstat_handler(State(state): State<AppState>, Query(params): Query<TermParams>) -> ApiResult<TermStatistics> {
    let ranker = state.ranker()?;
    let stats = term_statistics(&ranker, &params.term).map_err(error_response)?;
    Ok(Json(stats))
}

#[derive(Deserialize)]
pub struct SimilarityParams {
    pub docid: String,
    pub query: Option<String>,
    /// Second document to compare against instead of a query.
    pub other: Option<String>,
    #[serde(default = "default_content_field")]
    pub field: String,
}

#[derive(Serialize)]
pub struct SimilarityResponse {
    pub docid: String,
    pub field: String,
    pub similarity: f64,
}

pub async fn similarity_handler(State(state): State<AppState>, Query(params): Query<SimilarityParams>) -> ApiResult<SimilarityResponse> {
    let index = state.snapshot()?;
    let lookup = |external_id: &str| {
        index
            .find_document(external_id)
            .ok_or_else(|| error_response(ScoringError::UnknownDocument(external_id.to_string())))
    };
    let doc_id = lookup(&params.docid)?;
    let similarity = match (&params.other, &params.query) {
        (Some(other), _) => {
            let other_id = lookup(other)?;
            let a = document_vector(&*index, doc_id, &params.field).map_err(error_response)?;
            let b = document_vector(&*index, other_id, &params.field).map_err(error_response)?;
            cosine_similarity(&a, &b)
        }
        (None, Some(query)) => {
            query_document_similarity(&*index, doc_id, &params.field, query).map_err(error_response)?
        }
        (None, None) => return Err((StatusCode::BAD_REQUEST, "either query or other is required".into())),
    };
    Ok(Json(SimilarityResponse { docid: params.docid, field: params.field, similarity }))
}

#[derive(Serialize)]
pub struct ReloadResponse {
    pub generation: u64,
    pub num_docs: u32,
    pub loaded_at: String,
}

async fn reload_handler(State(state): State<AppState>, headers: HeaderMap) -> ApiResult<ReloadResponse> {
    authorize(&state, &headers)?;
    let index = corpus::load_corpus(&state.corpus_path)
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("reload failed: {e:#}")))?;
    let num_docs = index.doc_count();
    let generation = state.handle.replace(index);
    let loaded_at = time::OffsetDateTime::now_utc()
        .format(&time::format_description::well_known::Rfc3339)
        .unwrap_or_default();
    Ok(Json(ReloadResponse { generation, num_docs, loaded_at }))
}

async fn close_handler(State(state): State<AppState>, headers: HeaderMap) -> Result<StatusCode, (StatusCode, String)> {
    authorize(&state, &headers)?;
    state.handle.snapshot().close();
    Ok(StatusCode::NO_CONTENT)
}

fn authorize(state: &AppState, headers: &HeaderMap) -> Result<(), (StatusCode, String)> {
    let required = match &state.admin_token {
        Some(t) => t,
        None => return Err((StatusCode::UNAUTHORIZED, "ADMIN_TOKEN not set".into())),
    };
    let provided = headers.get("X-ADMIN-TOKEN").and_then(|v| v.to_str().ok()).unwrap_or("");
    if provided == required {
        Ok(())
    } else {
        Err((StatusCode::UNAUTHORIZED, "invalid admin token".into()))
    }
}
