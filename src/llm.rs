//! Rig-backed Gemini access: chat completion for the judge and the query
//! rewriter, plus query embeddings for retrieval.
//!
//! The pipeline consumes these capabilities through the traits below so
//! tests can inject deterministic stubs.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use tracing::info;

use crate::config::AppConfig;

/// Free-text generation against the reasoning engine. One stateless
/// request/response per call; no retries.
#[async_trait]
pub trait ReasoningEngine: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String>;
}

/// Turns case facts into a compact keyword search query.
#[async_trait]
pub trait QueryRewriter: Send + Sync {
    async fn rewrite(&self, case_text: &str) -> Result<String>;
}

/// Embeds a query string into the corpus vector space.
#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;
}

const REWRITE_PROMPT: &str = r#"You are a legal assistant for a retrieval system based on Indian criminal law.

Given the case facts below, generate a **concise and focused search query** with **only the most relevant legal keywords**. These should include:

- Specific **IPC sections**
- Core **legal concepts** (e.g., "right of private defence", "criminal breach of trust")
- **Crime type** (e.g., "assault", "corruption")
- Any relevant **procedural issue** (e.g., "absence of intent", "lack of evidence")

Do **not** include:
- Full sentences
- Personal names
- Generic or vague words (e.g., "man", "incident", "case", "situation")

Keep the query under **20 words**. Separate terms by commas if needed. Optimize for legal document search.

Return only the search query, no explanation or prefix."#;

/// How much of the raw case text stands in for a query when the rewriter
/// returns nothing usable.
const REWRITE_FALLBACK_PREFIX: usize = 50;

/// Gemini-backed implementation of all three collaborator traits.
#[derive(Debug, Clone)]
pub struct GeminiEngine {
    chat_model: String,
    embedding_model: String,
    configured: bool,
}

impl GeminiEngine {
    pub fn from_config(cfg: &AppConfig) -> Self {
        let configured = !cfg.gemini_api_key.is_empty();
        if configured {
            info!(model = %cfg.gemini_chat_model, "Gemini client configured");
        } else {
            tracing::warn!("GEMINI_API_KEY not provided; reasoning calls will fail");
        }
        Self {
            chat_model: cfg.gemini_chat_model.clone(),
            embedding_model: cfg.gemini_embedding_model.clone(),
            configured,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.configured
    }

    async fn prompt_gemini(&self, preamble: Option<&str>, input: &str) -> Result<String> {
        use rig::client::CompletionClient as _;
        use rig::completion::Prompt;
        use rig::providers::gemini;

        if !self.configured {
            return Err(anyhow!("Gemini client not initialized"));
        }

        let client = gemini::Client::from_env();
        let mut builder = client.agent(&self.chat_model);
        if let Some(preamble) = preamble {
            builder = builder.preamble(preamble);
        }
        let answer = builder.build().prompt(input).await?;
        Ok(answer)
    }
}

#[async_trait]
impl ReasoningEngine for GeminiEngine {
    async fn generate(&self, prompt: &str) -> Result<String> {
        // The adjudication prompt carries its own framing; no preamble.
        let text = self.prompt_gemini(None, prompt).await?;
        if text.trim().is_empty() {
            return Err(anyhow!("empty response from Gemini"));
        }
        Ok(text)
    }
}

#[async_trait]
impl QueryRewriter for GeminiEngine {
    /// Transport failures propagate as `Err`; an empty model reply falls
    /// back to a fixed-length prefix of the case facts.
    async fn rewrite(&self, case_text: &str) -> Result<String> {
        let raw = self.prompt_gemini(Some(REWRITE_PROMPT), case_text).await?;
        let query = raw
            .replace("Search Query:", "")
            .replace('\n', " ")
            .trim()
            .trim_matches('"')
            .to_string();

        if query.is_empty() {
            Ok(case_text.chars().take(REWRITE_FALLBACK_PREFIX).collect())
        } else {
            Ok(query)
        }
    }
}

#[async_trait]
impl Embedder for GeminiEngine {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        use rig::client::EmbeddingsClient as _;
        use rig::embeddings::EmbeddingModel as _;
        use rig::providers::gemini;

        if !self.configured {
            return Err(anyhow!("Gemini client not initialized"));
        }

        let client = gemini::Client::from_env();
        let model = client.embedding_model(&self.embedding_model);
        let embeddings = model.embed_texts(vec![text.to_string()]).await?;
        let embedding = embeddings
            .into_iter()
            .next()
            .ok_or_else(|| anyhow!("no embedding returned for query"))?;

        Ok(embedding.vec.into_iter().map(|x| x as f32).collect())
    }
}
