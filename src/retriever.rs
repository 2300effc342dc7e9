//! Similarity Retriever: one embedding, fanned out across every category
//! index concurrently, joined before returning.
//!
//! The returned map always carries every enumerated category; unloaded or
//! failing categories degrade to empty lists instead of failing the pass.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::warn;

use crate::category::Category;
use crate::llm::Embedder;
use crate::models::Chunk;
use crate::registry::CorpusRegistry;

pub struct SimilarityRetriever {
    registry: Arc<CorpusRegistry>,
    embedder: Arc<dyn Embedder>,
    top_k: usize,
}

impl SimilarityRetriever {
    pub fn new(registry: Arc<CorpusRegistry>, embedder: Arc<dyn Embedder>, top_k: usize) -> Self {
        Self {
            registry,
            embedder,
            top_k,
        }
    }

    /// Top-k chunks per category for one query string. Embeds the query
    /// once, then dispatches one task per category; the pool is bounded by
    /// the category count. Never fails: an embedding failure degrades the
    /// whole pass to empty lists, a category failure only that category.
    pub async fn retrieve(&self, query: &str) -> HashMap<Category, Vec<Chunk>> {
        let query_vec = match self.embedder.embed(query).await {
            Ok(v) => Arc::new(v),
            Err(e) => {
                warn!(error = %e, "query embedding failed, degrading to empty retrieval");
                return empty_result_map();
            }
        };

        let mut tasks = Vec::with_capacity(Category::ALL.len());
        for cat in Category::ALL {
            let registry = Arc::clone(&self.registry);
            let query_vec = Arc::clone(&query_vec);
            let k = self.top_k;
            tasks.push(tokio::spawn(async move {
                (cat, search_category(&registry, cat, &query_vec, k))
            }));
        }

        let mut results = empty_result_map();
        for (cat, joined) in Category::ALL.into_iter().zip(futures::future::join_all(tasks).await) {
            match joined {
                Ok((cat, chunks)) => {
                    results.insert(cat, chunks);
                }
                Err(e) => {
                    warn!(category = %cat, error = %e, "category search task panicked");
                }
            }
        }
        results
    }
}

/// Searches one category. Unloaded categories and search errors both come
/// back as an empty list; neighbor ids outside the corpus are discarded.
fn search_category(
    registry: &CorpusRegistry,
    category: Category,
    query_vec: &[f32],
    k: usize,
) -> Vec<Chunk> {
    let Some(loaded) = registry.lookup(category) else {
        return Vec::new();
    };

    let hits = match loaded.index.search(query_vec, k) {
        Ok(hits) => hits,
        Err(e) => {
            warn!(category = %category, error = %e, "category search failed, degrading to empty");
            return Vec::new();
        }
    };

    let mut chunks = Vec::with_capacity(hits.len());
    for (_score, id) in hits {
        match loaded.chunks.get(id) {
            Some(payload) => chunks.push(Chunk::new(category, payload.clone())),
            None => warn!(category = %category, id, "neighbor id out of corpus bounds, discarded"),
        }
    }
    chunks
}

fn empty_result_map() -> HashMap<Category, Vec<Chunk>> {
    Category::ALL.into_iter().map(|c| (c, Vec::new())).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::CategoryIndex;
    use crate::vector_store::FlatIndex;
    use anyhow::Result;
    use async_trait::async_trait;
    use serde_json::json;

    struct FixedEmbedder(Vec<f32>);

    #[async_trait]
    impl Embedder for FixedEmbedder {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
            Ok(self.0.clone())
        }
    }

    struct FailingEmbedder;

    #[async_trait]
    impl Embedder for FailingEmbedder {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
            anyhow::bail!("embedder offline")
        }
    }

    fn ipc_registry() -> CorpusRegistry {
        let index = FlatIndex::from_vectors(
            2,
            vec![vec![1.0, 0.0], vec![0.0, 1.0], vec![0.7, 0.7]],
        )
        .unwrap();
        let chunks = vec![
            json!({"text": "Section 302"}),
            json!({"text": "Section 378"}),
            json!({"text": "Section 304"}),
        ];
        CorpusRegistry::from_parts(vec![(Category::IpcSections, CategoryIndex { index, chunks })])
    }

    #[tokio::test]
    async fn result_map_covers_every_category() {
        let retriever = SimilarityRetriever::new(
            Arc::new(ipc_registry()),
            Arc::new(FixedEmbedder(vec![1.0, 0.0])),
            2,
        );
        let results = retriever.retrieve("theft at night").await;
        assert_eq!(results.len(), Category::ALL.len());
        assert_eq!(results[&Category::IpcSections].len(), 2);
        assert!(results[&Category::Constitution].is_empty());
    }

    #[tokio::test]
    async fn best_match_comes_first() {
        let retriever = SimilarityRetriever::new(
            Arc::new(ipc_registry()),
            Arc::new(FixedEmbedder(vec![1.0, 0.0])),
            3,
        );
        let results = retriever.retrieve("murder").await;
        let texts: Vec<String> = results[&Category::IpcSections]
            .iter()
            .map(Chunk::dedup_key)
            .collect();
        assert_eq!(texts[0], "Section 302");
    }

    #[tokio::test]
    async fn embedding_failure_degrades_to_all_empty() {
        let retriever =
            SimilarityRetriever::new(Arc::new(ipc_registry()), Arc::new(FailingEmbedder), 5);
        let results = retriever.retrieve("anything").await;
        assert_eq!(results.len(), Category::ALL.len());
        assert!(results.values().all(Vec::is_empty));
    }

    #[tokio::test]
    async fn dimension_mismatch_degrades_that_category() {
        // Query embedded in the wrong dimensionality: the category search
        // errors and the pass still succeeds with an empty list.
        let retriever = SimilarityRetriever::new(
            Arc::new(ipc_registry()),
            Arc::new(FixedEmbedder(vec![1.0, 0.0, 0.0])),
            5,
        );
        let results = retriever.retrieve("anything").await;
        assert!(results[&Category::IpcSections].is_empty());
    }
}
