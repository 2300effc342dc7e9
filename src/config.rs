//! Application configuration (corpus paths, Gemini models, RAG tuning).

use anyhow::Result;
use std::env;
use std::path::PathBuf;

use crate::category::Category;

/// Complete application configuration, loaded once at startup.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub server_addr: String,

    /// Directory holding the per-category `(vectors, chunks)` file pairs.
    pub corpus_dir: PathBuf,

    pub gemini_api_key: String,
    pub gemini_chat_model: String,
    pub gemini_embedding_model: String,

    /// Neighbors requested per category per retrieval pass.
    pub top_k_results: usize,
    /// Cap on unique chunks per category after fusion.
    pub max_unique_chunks: usize,
    /// Below this confidence the judge may freely revise the verdict.
    pub confidence_threshold: f64,
    /// Minimum accepted case-text length.
    pub min_case_text_len: usize,
}

impl AppConfig {
    /// Loads configuration from environment variables (honoring `.env`).
    /// Everything has a default except the Gemini API key, which may be
    /// empty; the reasoning engine then reports itself unconfigured.
    pub fn from_env() -> Result<Self> {
        let server_addr =
            env::var("SERVER_ADDR").unwrap_or_else(|_| "127.0.0.1:5000".to_string());

        let corpus_dir = env::var("CORPUS_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./corpus"));

        let gemini_api_key = env::var("GEMINI_API_KEY").unwrap_or_default();
        let gemini_chat_model =
            env::var("GEMINI_CHAT_MODEL").unwrap_or_else(|_| "gemini-2.5-flash".to_string());
        let gemini_embedding_model = env::var("GEMINI_EMBEDDING_MODEL")
            .unwrap_or_else(|_| "text-embedding-004".to_string());

        let top_k_results = parse_env("TOP_K_RESULTS", 5)?;
        let max_unique_chunks = parse_env("MAX_UNIQUE_CHUNKS", 10)?;
        let confidence_threshold = parse_env("CONFIDENCE_THRESHOLD", 0.6)?;
        let min_case_text_len = parse_env("MIN_CASE_TEXT_LEN", 10)?;

        Ok(Self {
            server_addr,
            corpus_dir,
            gemini_api_key,
            gemini_chat_model,
            gemini_embedding_model,
            top_k_results,
            max_unique_chunks,
            confidence_threshold,
            min_case_text_len,
        })
    }

    /// Absolute `(index path, chunks path)` pair for one category.
    pub fn category_paths(&self, category: Category) -> (PathBuf, PathBuf) {
        let (index_name, chunks_name) = category.file_names();
        (
            self.corpus_dir.join(index_name),
            self.corpus_dir.join(chunks_name),
        )
    }
}

fn parse_env<T: std::str::FromStr>(name: &str, default: T) -> Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(raw) => Ok(raw
            .parse()
            .map_err(|e| anyhow::anyhow!("invalid {name}={raw}: {e}"))?),
        Err(_) => Ok(default),
    }
}
