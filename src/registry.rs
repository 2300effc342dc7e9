//! Corpus Index Registry: per-category `(vector index, chunk corpus)` pairs.
//!
//! Loading is best-effort by design. A category whose backing files are
//! missing, unparseable, or inconsistent is simply absent from the
//! registry; the pipeline keeps working with whatever subset loaded,
//! including none at all.

use anyhow::{anyhow, Result};
use std::collections::HashMap;
use std::path::Path;
use tracing::{info, warn};

use crate::category::Category;
use crate::config::AppConfig;
use crate::vector_store::FlatIndex;

/// One loaded category: the index and its parallel chunk corpus.
/// Row `i` of the index scores the payload at `chunks[i]`.
#[derive(Debug)]
pub struct CategoryIndex {
    pub index: FlatIndex,
    pub chunks: Vec<serde_json::Value>,
}

/// Outcome of one category load attempt.
enum LoadOutcome {
    Loaded(CategoryIndex),
    Absent(String),
}

/// Read-only registry of loaded categories. Built once at startup and
/// shared behind an `Arc`; never mutated afterwards.
#[derive(Debug, Default)]
pub struct CorpusRegistry {
    categories: HashMap<Category, CategoryIndex>,
}

impl CorpusRegistry {
    /// Attempts to load every enumerated category from the configured
    /// corpus directory. Never fails; absent categories are logged.
    pub fn load(cfg: &AppConfig) -> Self {
        let mut categories = HashMap::new();
        for cat in Category::ALL {
            let (index_path, chunks_path) = cfg.category_paths(cat);
            match load_category(&index_path, &chunks_path) {
                LoadOutcome::Loaded(loaded) => {
                    info!(
                        category = %cat,
                        chunks = loaded.chunks.len(),
                        "corpus category loaded"
                    );
                    categories.insert(cat, loaded);
                }
                LoadOutcome::Absent(reason) => {
                    warn!(category = %cat, %reason, "corpus category absent");
                }
            }
        }
        Self { categories }
    }

    /// Builds a registry from already-loaded categories. Used by tests.
    pub fn from_parts(parts: Vec<(Category, CategoryIndex)>) -> Self {
        Self {
            categories: parts.into_iter().collect(),
        }
    }

    /// True iff at least one category loaded.
    pub fn is_loaded(&self) -> bool {
        !self.categories.is_empty()
    }

    /// Loaded category names, in the fixed enumeration order.
    pub fn loaded_categories(&self) -> Vec<Category> {
        Category::ALL
            .into_iter()
            .filter(|c| self.categories.contains_key(c))
            .collect()
    }

    pub fn lookup(&self, category: Category) -> Option<&CategoryIndex> {
        self.categories.get(&category)
    }
}

fn load_category(index_path: &Path, chunks_path: &Path) -> LoadOutcome {
    match try_load_category(index_path, chunks_path) {
        Ok(loaded) => LoadOutcome::Loaded(loaded),
        Err(e) => LoadOutcome::Absent(e.to_string()),
    }
}

fn try_load_category(index_path: &Path, chunks_path: &Path) -> Result<CategoryIndex> {
    if !index_path.exists() {
        return Err(anyhow!("missing index file {}", index_path.display()));
    }
    if !chunks_path.exists() {
        return Err(anyhow!("missing chunks file {}", chunks_path.display()));
    }

    let index = FlatIndex::load(index_path)?;
    let raw = std::fs::read_to_string(chunks_path)?;
    let chunks: Vec<serde_json::Value> = serde_json::from_str(&raw)?;

    // Index rows and chunk entries must line up one-to-one.
    if index.len() != chunks.len() {
        return Err(anyhow!(
            "cardinality mismatch: {} index rows vs {} chunks",
            index.len(),
            chunks.len()
        ));
    }

    Ok(CategoryIndex { index, chunks })
}
