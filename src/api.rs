use axum::{
    extract::{Json, State},
    http::StatusCode,
    routing::{get, post},
    Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{error, info};
use uuid::Uuid;

use crate::app_state::AppState;
use crate::models::{AdjudicationOutcome, AdjudicationRequest};

// --- API payloads and responses ---

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseAnalysisPayload {
    pub case_text: String,
    #[serde(default = "default_true")]
    pub use_query_generation: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseAnalysisResponse {
    pub initial_verdict: String,
    pub initial_confidence: f64,
    pub final_verdict: Option<String>,
    pub verdict_changed: bool,
    pub search_query: Option<String>,
    pub explanation: Option<String>,
    pub supporting_sources: serde_json::Value,
    pub analysis_logs: AdjudicationOutcome,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub services: serde_json::Value,
    pub checked_at: String,
}

// --- Router ---

pub fn create_router(app_state: AppState) -> Router {
    Router::new()
        .route("/", get(root_handler))
        .route("/api/v1/health", get(health_handler))
        .route("/api/v1/models/status", get(models_status_handler))
        .route("/api/v1/analyze-case", post(analyze_case_handler))
        .with_state(app_state)
}

// --- Handlers ---

#[axum::debug_handler]
async fn root_handler() -> Json<serde_json::Value> {
    Json(json!({
        "message": "Legal RAG Verdict API",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

#[axum::debug_handler]
async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    let corpora_ok = state.registry.is_loaded();
    let reasoning_ok = state.reasoning_configured;

    let status = if corpora_ok && reasoning_ok {
        "healthy"
    } else {
        "degraded"
    };

    Json(HealthResponse {
        status,
        services: json!({
            "classifier": true,
            "corpora": corpora_ok,
            "reasoningEngine": reasoning_ok,
        }),
        checked_at: Utc::now().to_rfc3339(),
    })
}

#[axum::debug_handler]
async fn models_status_handler(State(state): State<AppState>) -> Json<serde_json::Value> {
    let loaded: Vec<&str> = state
        .registry
        .loaded_categories()
        .into_iter()
        .map(|c| c.name())
        .collect();

    Json(json!({
        "classifier": {
            "loaded": state.classifier.is_model_loaded(),
        },
        "corpusIndexes": {
            "loaded": state.registry.is_loaded(),
            "indexCount": loaded.len(),
            "categories": loaded,
        },
        "reasoningEngine": {
            "configured": state.reasoning_configured,
        },
    }))
}

#[axum::debug_handler]
async fn analyze_case_handler(
    State(state): State<AppState>,
    Json(payload): Json<CaseAnalysisPayload>,
) -> Result<Json<CaseAnalysisResponse>, (StatusCode, Json<serde_json::Value>)> {
    if case_text_too_short(&payload.case_text, state.config.min_case_text_len) {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": format!(
                    "caseText must be at least {} characters",
                    state.config.min_case_text_len
                )
            })),
        ));
    }

    let case_id = Uuid::new_v4();
    info!(%case_id, text_len = payload.case_text.len(), "analyzing case");

    let (initial_verdict, confidence) = state.classifier.classify(&payload.case_text).await;
    info!(%case_id, verdict = %initial_verdict, confidence, "initial verdict");

    let outcome = state
        .adjudicator
        .adjudicate(AdjudicationRequest {
            case_text: payload.case_text,
            initial_verdict,
            initial_confidence: confidence,
            use_query_rewrite: payload.use_query_generation,
        })
        .await;

    if let Some(err) = &outcome.error {
        error!(%case_id, error = %err, "adjudication terminated early");
    }

    let supporting_sources = outcome
        .support
        .as_ref()
        .map(|s| serde_json::to_value(s).unwrap_or_default())
        .unwrap_or_else(|| json!({}));

    Ok(Json(CaseAnalysisResponse {
        initial_verdict: outcome.initial_verdict.to_string(),
        initial_confidence: outcome.initial_confidence,
        final_verdict: outcome.final_verdict.map(|v| v.to_string()),
        verdict_changed: outcome
            .verdict_changed
            .map(|c| c.is_changed())
            .unwrap_or(false),
        search_query: outcome.search_query.clone(),
        explanation: outcome.explanation.clone(),
        supporting_sources,
        analysis_logs: outcome,
    }))
}

/// Minimum length is measured in characters, not bytes, so multi-byte
/// scripts are not undercounted.
fn case_text_too_short(case_text: &str, min_len: usize) -> bool {
    case_text.trim().chars().count() < min_len
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn length_check_counts_characters_not_bytes() {
        // Nine Devanagari characters occupy 27 bytes; still too short.
        let nine_chars = "अ".repeat(9);
        assert_eq!(nine_chars.len(), 27);
        assert!(case_text_too_short(&nine_chars, 10));
        // Ten characters pass regardless of byte width.
        assert!(!case_text_too_short(&"अ".repeat(10), 10));
        assert!(!case_text_too_short("plain text", 10));
    }

    #[test]
    fn surrounding_whitespace_does_not_count() {
        assert!(case_text_too_short("   short    ", 10));
    }
}
