//! Adjudication Orchestrator: one linear pipeline per case.
//!
//! fuse → build prompt → reasoning call → extract. Every stage below the
//! reasoning call has already degraded internally, so the only early exit
//! left is a reasoning-engine failure, which becomes an error outcome;
//! the caller always receives a well-formed record, never an `Err`.

use std::sync::Arc;

use tracing::{error, info};

use crate::fusion::FusionEngine;
use crate::llm::ReasoningEngine;
use crate::models::{AdjudicationOutcome, AdjudicationRequest};
use crate::prompt::{build_adjudication_prompt, PromptInputs};
use crate::verdict::extract_final_verdict;

pub struct Adjudicator {
    fusion: FusionEngine,
    reasoning: Arc<dyn ReasoningEngine>,
    per_category_cap: usize,
    confidence_threshold: f64,
}

impl Adjudicator {
    pub fn new(
        fusion: FusionEngine,
        reasoning: Arc<dyn ReasoningEngine>,
        per_category_cap: usize,
        confidence_threshold: f64,
    ) -> Self {
        Self {
            fusion,
            reasoning,
            per_category_cap,
            confidence_threshold,
        }
    }

    pub async fn adjudicate(&self, request: AdjudicationRequest) -> AdjudicationOutcome {
        let (support, query_used) = self
            .fusion
            .fuse(&request.case_text, request.use_query_rewrite)
            .await;
        info!(
            chunks = support.total_chunks(),
            query = %query_used,
            "support set fused"
        );

        let prompt = build_adjudication_prompt(&PromptInputs {
            case_text: &request.case_text,
            initial_verdict: request.initial_verdict,
            confidence: request.initial_confidence,
            support: &support,
            query: Some(&query_used),
            per_category_cap: self.per_category_cap,
            confidence_threshold: self.confidence_threshold,
        });

        let explanation = match self.reasoning.generate(&prompt).await {
            Ok(text) => text,
            Err(e) => {
                error!(error = %e, "reasoning engine call failed");
                return AdjudicationOutcome::failure(
                    &request,
                    format!("reasoning engine call failed: {e}"),
                );
            }
        };

        let (final_verdict, verdict_changed) = extract_final_verdict(&explanation);
        info!(
            final_verdict = ?final_verdict,
            changed = verdict_changed.as_str(),
            "adjudication complete"
        );

        AdjudicationOutcome {
            input_text: request.case_text,
            initial_verdict: request.initial_verdict,
            initial_confidence: request.initial_confidence,
            search_query: Some(query_used),
            support: Some(support),
            prompt: Some(prompt),
            explanation: Some(explanation),
            final_verdict,
            verdict_changed: Some(verdict_changed),
            error: None,
        }
    }
}
