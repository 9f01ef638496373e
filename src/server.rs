//! HTTP surface and process wiring.
//!
//! [`build_orchestrator`] opens the database, embedding provider and model client and
//! hands them to a [`ConversationOrchestrator`]. [`router`] exposes it over axum and
//! [`serve`] runs the router until Ctrl-C.

use std::sync::{Arc, Mutex};

use anyhow::Result;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::config::EllaConfig;
use crate::db;
use crate::embedding;
use crate::llm::{LanguageModel, OpenAIModel};
use crate::memory::DEFAULT_THREAD;
use crate::orchestrator::{ChatResult, ConversationOrchestrator, FailureKind};
use crate::store::{DurableStore, SqliteStore};

/// Open the store and model collaborators described by `config` and wire them into an
/// orchestrator.
pub fn build_orchestrator(config: &EllaConfig) -> Result<Arc<ConversationOrchestrator>> {
    let provider: Arc<dyn embedding::EmbeddingProvider> =
        Arc::from(embedding::create_provider(&config.embedding)?);

    let db_path = config.resolved_db_path();
    let conn = db::open_database(&db_path, provider.dimensions(), provider.model_id())?;
    tracing::info!(db = %db_path.display(), "database ready");

    if let Some(stored_model) = db::meta::embedding_model_mismatch(&conn, provider.model_id())? {
        tracing::warn!(
            stored = %stored_model,
            configured = %provider.model_id(),
            "embedding model changed; recall quality will suffer until history is re-embedded"
        );
    }

    let store: Arc<dyn DurableStore> =
        Arc::new(SqliteStore::new(Arc::new(Mutex::new(conn)), provider));
    let model: Arc<dyn LanguageModel> = Arc::new(OpenAIModel::new(&config.model)?);
    tracing::info!(model = %config.model.model, "language model ready");

    Ok(Arc::new(ConversationOrchestrator::new(
        store,
        model,
        &config.conversation,
    )))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ChatRequest {
    pub author: String,
    pub message: String,
    pub thread_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ThreadQuery {
    pub thread_id: Option<String>,
}

impl ThreadQuery {
    fn thread_id(&self) -> &str {
        self.thread_id.as_deref().unwrap_or(DEFAULT_THREAD)
    }
}

pub fn router(orchestrator: Arc<ConversationOrchestrator>) -> Router {
    Router::new()
        .route("/chat", post(chat))
        .route("/memory", get(get_memory))
        .route("/memory/clear", post(clear_memory))
        .route("/health", get(health))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(orchestrator)
}

async fn chat(
    State(orchestrator): State<Arc<ConversationOrchestrator>>,
    Json(request): Json<ChatRequest>,
) -> Response {
    let thread_id = request.thread_id.as_deref().unwrap_or(DEFAULT_THREAD);
    let result = orchestrator
        .handle_message_in(thread_id, &request.author, &request.message)
        .await;

    match result {
        ChatResult::Clarify { text } => Json(json!({ "message": text })).into_response(),
        ChatResult::Answer {
            prior_context,
            response,
        } => Json(json!({ "context": prior_context, "response": response })).into_response(),
        ChatResult::Failure { kind, detail } => {
            let status = match kind {
                FailureKind::Validation => StatusCode::BAD_REQUEST,
                FailureKind::Model => StatusCode::BAD_GATEWAY,
                FailureKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
            };
            (status, Json(json!({ "error": kind, "detail": detail }))).into_response()
        }
    }
}

async fn get_memory(
    State(orchestrator): State<Arc<ConversationOrchestrator>>,
    Query(query): Query<ThreadQuery>,
) -> impl IntoResponse {
    let messages = orchestrator.memory_snapshot_of(query.thread_id()).await;
    Json(json!({ "messages": messages }))
}

async fn clear_memory(
    State(orchestrator): State<Arc<ConversationOrchestrator>>,
    Query(query): Query<ThreadQuery>,
) -> impl IntoResponse {
    orchestrator.clear_memory_of(query.thread_id()).await;
    Json(json!({ "message": "Thread memory cleared." }))
}

async fn health(State(orchestrator): State<Arc<ConversationOrchestrator>>) -> impl IntoResponse {
    Json(json!({ "status": "ok", "threads": orchestrator.thread_count() }))
}

/// Serve the HTTP API on the configured address until Ctrl-C.
pub async fn serve(config: EllaConfig) -> Result<()> {
    let bind_addr = config.bind_addr();
    tracing::info!(addr = %bind_addr, "starting Ella chat server");

    let orchestrator = build_orchestrator(&config)?;
    let app = router(orchestrator);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!(addr = %bind_addr, "listening at http://{bind_addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "failed to listen for ctrl-c");
                std::future::pending::<()>().await;
            }
            tracing::info!("shutting down chat server");
        })
        .await?;

    tracing::info!("chat server stopped, database connection released");
    Ok(())
}
