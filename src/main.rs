mod api;
mod app_state;
mod category;
mod classifier;
mod config;
mod fusion;
mod llm;
mod models;
mod orchestrator;
mod prompt;
mod registry;
mod retriever;
mod vector_store;
mod verdict;

use std::sync::Arc;

use tower_http::cors::{Any, CorsLayer};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::app_state::AppState;
use crate::classifier::HashClassifier;
use crate::fusion::FusionEngine;
use crate::llm::GeminiEngine;
use crate::orchestrator::Adjudicator;
use crate::registry::CorpusRegistry;
use crate::retriever::SimilarityRetriever;

#[tokio::main]
async fn main() {
    // 1. Load .env and initialize logging
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // 2. Load configuration
    let cfg = config::AppConfig::from_env().expect("failed to load configuration");

    // 3. Load corpus indexes (best effort; absent categories are logged)
    let registry = Arc::new(CorpusRegistry::load(&cfg));
    info!(
        loaded = registry.loaded_categories().len(),
        "corpus registry initialized"
    );

    // 4. Wire the pipeline: Gemini engine, retriever, fusion, orchestrator
    let gemini = Arc::new(GeminiEngine::from_config(&cfg));
    let reasoning_configured = gemini.is_configured();

    let retriever = SimilarityRetriever::new(
        Arc::clone(&registry),
        gemini.clone() as Arc<dyn llm::Embedder>,
        cfg.top_k_results,
    );
    let fusion = FusionEngine::new(
        retriever,
        gemini.clone() as Arc<dyn llm::QueryRewriter>,
        cfg.max_unique_chunks,
    );
    let adjudicator = Arc::new(Adjudicator::new(
        fusion,
        gemini as Arc<dyn llm::ReasoningEngine>,
        cfg.max_unique_chunks,
        cfg.confidence_threshold,
    ));

    // 5. Shared application state
    let app_state = AppState {
        config: cfg.clone(),
        registry,
        classifier: Arc::new(HashClassifier),
        adjudicator,
        reasoning_configured,
    };

    // 6. Router with permissive CORS
    let app = api::create_router(app_state).layer(
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any),
    );

    // 7. Serve until ctrl-c
    let listener = tokio::net::TcpListener::bind(&cfg.server_addr)
        .await
        .expect("failed to bind server address");
    info!("listening on http://{}", cfg.server_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
            info!("shutdown signal received");
        })
        .await
        .expect("server error");

    info!("server stopped");
}
