use anyhow::Result;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use engine::{DocId, SearchEngine};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

#[derive(Deserialize)]
pub struct SearchParams {
    pub q: String,
    #[serde(default = "default_k")]
    pub k: usize,
}
fn default_k() -> usize {
    10
}

#[derive(Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub took_ms: f64,
    pub total_hits: usize,
    pub results: Vec<SearchHit>,
}

#[derive(Serialize)]
pub struct SearchHit {
    pub doc_id: DocId,
    pub url: String,
    pub title: String,
}

#[derive(Clone)]
pub struct AppState {
    // Search is read-only over the loaded index, so sharing it is safe.
    pub engine: Arc<SearchEngine>,
}

pub fn build_app<P: AsRef<std::path::Path>>(index_dir: P) -> Result<Router> {
    let engine = SearchEngine::load(index_dir)?;
    tracing::info!(
        vocabulary = engine.vocabulary_size(),
        documents = engine.num_doc_slots(),
        "index loaded"
    );
    let state = AppState {
        engine: Arc::new(engine),
    };

    // CORS: read CORS_ALLOW_ORIGIN (comma-separated) or allow Any by default
    let cors = match std::env::var("CORS_ALLOW_ORIGIN") {
        Ok(val) => {
            let origins: Vec<_> = val
                .split(',')
                .filter_map(|s| s.trim().parse().ok())
                .collect();
            if origins.is_empty() {
                CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any)
            } else {
                CorsLayer::new()
                    .allow_origin(AllowOrigin::list(origins))
                    .allow_methods(Any)
                    .allow_headers(Any)
            }
        }
        Err(_) => CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any),
    };

    let app = Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/search", get(search_handler))
        .route("/doc/:doc_id", get(doc_handler))
        .with_state(state)
        .layer(cors);
    Ok(app)
}

pub async fn search_handler(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Json<SearchResponse> {
    let start = std::time::Instant::now();
    let (results, total_hits) = state.engine.search(&params.q);
    let k = params.k.clamp(1, 100);
    let hits = results
        .into_iter()
        .take(k)
        .map(|r| SearchHit {
            doc_id: r.doc_id,
            url: r.url,
            title: r.title,
        })
        .collect();
    Json(SearchResponse {
        query: params.q,
        took_ms: start.elapsed().as_secs_f64() * 1000.0,
        total_hits,
        results: hits,
    })
}

pub async fn doc_handler(
    State(state): State<AppState>,
    Path(doc_id): Path<DocId>,
) -> Result<Json<serde_json::Value>, StatusCode> {
    match state.engine.document(doc_id) {
        Some((url, title)) => Ok(Json(serde_json::json!({
            "doc_id": doc_id,
            "url": url,
            "title": title,
        }))),
        None => Err(StatusCode::NOT_FOUND),
    }
}
