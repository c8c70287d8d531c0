use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};
use url::Url;

use sitebot_core::compose::{compose, Source};
use sitebot_core::intent::{classify, expand_query, key_terms};
use sitebot_core::persist::{load_documents, save_documents};
use sitebot_core::retrieve::retrieve;
use sitebot_core::{Document, Snapshot};
use sitebot_crawler::{crawl, CrawlConfig};

#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub origin: Url,
    pub seeds: Vec<Url>,
    pub max_pages: usize,
    pub concurrency: usize,
    pub timeout: Duration,
    pub user_agent: String,
    pub snapshot_path: PathBuf,
    pub contact_phone: String,
    pub contact_email: String,
}

#[derive(Clone)]
pub struct AppState {
    /// The live snapshot. Readers clone the inner Arc and work against
    /// that; ingest installs a fully-built replacement under the write
    /// lock, so a reader never sees a half-built index.
    snapshot: Arc<RwLock<Option<Arc<Snapshot>>>>,
    config: Arc<ServiceConfig>,
}

impl AppState {
    fn current(&self) -> Option<Arc<Snapshot>> {
        self.snapshot.read().clone()
    }

    fn install(&self, snapshot: Snapshot) {
        *self.snapshot.write() = Some(Arc::new(snapshot));
    }
}

pub fn build_app(config: ServiceConfig) -> Router {
    // A missing or unreadable snapshot is not fatal: the service starts
    // not-ready and an ingest populates it.
    let snapshot = match load_documents(&config.snapshot_path) {
        Ok(docs) if !docs.is_empty() => {
            info!(documents = docs.len(), "snapshot loaded");
            Some(Arc::new(Snapshot::build(docs)))
        }
        Ok(_) => {
            warn!("snapshot is empty, starting without an index");
            None
        }
        Err(e) => {
            warn!(error = %e, "no usable snapshot, starting without an index");
            None
        }
    };
    let state = AppState {
        snapshot: Arc::new(RwLock::new(snapshot)),
        config: Arc::new(config),
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_handler))
        .route("/chat", post(chat_handler))
        .route("/ingest", post(ingest_handler))
        .route("/dump", get(dump_handler))
        .with_state(state)
        .layer(cors)
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub ready: bool,
    pub documents: usize,
}

async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    match state.current() {
        Some(snapshot) => Json(HealthResponse {
            ready: true,
            documents: snapshot.len(),
        }),
        None => Json(HealthResponse {
            ready: false,
            documents: 0,
        }),
    }
}

#[derive(Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub question: String,
}

#[derive(Serialize)]
pub struct ContactInfo {
    pub phone: String,
    pub email: String,
}

#[derive(Serialize)]
pub struct ChatResponse {
    pub intent: String,
    pub answer: String,
    pub sources: Vec<Source>,
    pub fallback_contact: ContactInfo,
}

async fn chat_handler(
    State(state): State<AppState>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, (StatusCode, String)> {
    let Some(snapshot) = state.current() else {
        return Err((
            StatusCode::SERVICE_UNAVAILABLE,
            "index not ready: run ingest first".into(),
        ));
    };
    let contact = ContactInfo {
        phone: state.config.contact_phone.clone(),
        email: state.config.contact_email.clone(),
    };

    let question = req.question.trim();
    if question.is_empty() {
        return Ok(Json(ChatResponse {
            intent: "general".into(),
            answer: String::new(),
            sources: Vec::new(),
            fallback_contact: contact,
        }));
    }

    let intent = classify(question);
    let intent_id = intent.map(|i| i.id).unwrap_or("general").to_string();
    let expanded = expand_query(question, intent);
    let terms = key_terms(question, intent);
    let results = retrieve(&snapshot, question, intent, &expanded, &terms);
    if results.is_empty() {
        return Ok(Json(ChatResponse {
            intent: intent_id,
            answer: String::new(),
            sources: Vec::new(),
            fallback_contact: contact,
        }));
    }

    let composed = compose(&snapshot, &results, &terms, intent);
    Ok(Json(ChatResponse {
        intent: intent_id,
        answer: composed.text,
        sources: composed.sources,
        fallback_contact: contact,
    }))
}

#[derive(Serialize)]
pub struct IngestResponse {
    pub pages: usize,
}

async fn ingest_handler(
    State(state): State<AppState>,
) -> Result<Json<IngestResponse>, (StatusCode, String)> {
    let cfg = &state.config;
    let crawl_config = CrawlConfig {
        origin: cfg.origin.clone(),
        seeds: cfg.seeds.clone(),
        max_pages: cfg.max_pages,
        concurrency: cfg.concurrency,
        timeout: cfg.timeout,
        user_agent: cfg.user_agent.clone(),
    };
    let documents = crawl(&crawl_config)
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("crawl failed: {e}")))?;
    let pages = documents.len();

    if let Err(e) = save_documents(&cfg.snapshot_path, &documents) {
        warn!(error = %e, "failed to persist snapshot");
    }
    state.install(Snapshot::build(documents));
    info!(pages, "ingest complete");
    Ok(Json(IngestResponse { pages }))
}

async fn dump_handler(
    State(state): State<AppState>,
) -> Result<Json<Vec<Document>>, (StatusCode, String)> {
    let Some(snapshot) = state.current() else {
        return Err((
            StatusCode::SERVICE_UNAVAILABLE,
            "index not ready: run ingest first".into(),
        ));
    };
    Ok(Json(snapshot.documents.clone()))
}
