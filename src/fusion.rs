//! Dual-Query Fusion Engine: two retrieval passes merged into one bounded
//! SupportSet per request.
//!
//! Pass A runs over the raw case text, pass B over the rewritten query when
//! rewriting is enabled. Pass A always wins ties: for a chunk retrieved by
//! both passes, the occurrence grounded in the literal case text is the one
//! kept. Rewriter failure degrades pass B to the raw case text instead of
//! aborting.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{info, warn};

use crate::category::Category;
use crate::llm::QueryRewriter;
use crate::models::{Chunk, SupportSet};
use crate::retriever::SimilarityRetriever;

pub struct FusionEngine {
    retriever: SimilarityRetriever,
    rewriter: Arc<dyn QueryRewriter>,
    max_unique_chunks: usize,
}

impl FusionEngine {
    pub fn new(
        retriever: SimilarityRetriever,
        rewriter: Arc<dyn QueryRewriter>,
        max_unique_chunks: usize,
    ) -> Self {
        Self {
            retriever,
            rewriter,
            max_unique_chunks,
        }
    }

    /// Produces the fused SupportSet and the second-pass query string used
    /// (reported back for logging). Never fails; every failure below this
    /// point has already degraded to an empty or fallback value.
    pub async fn fuse(&self, case_text: &str, rewrite_enabled: bool) -> (SupportSet, String) {
        let second_query = if rewrite_enabled {
            match self.rewriter.rewrite(case_text).await {
                Ok(query) if !query.trim().is_empty() => {
                    info!(%query, "rewritten retrieval query");
                    query
                }
                Ok(_) => {
                    warn!("rewriter returned empty query, falling back to case text");
                    case_text.to_string()
                }
                Err(e) => {
                    warn!(error = %e, "query rewrite failed, falling back to case text");
                    case_text.to_string()
                }
            }
        } else {
            case_text.to_string()
        };

        let pass_a = self.retriever.retrieve(case_text).await;
        // Skip the second pass when it would just repeat the first.
        let pass_b = if second_query == case_text {
            None
        } else {
            Some(self.retriever.retrieve(&second_query).await)
        };

        let mut support = SupportSet::new();
        for cat in Category::ALL {
            let a = pass_a.get(&cat).map(Vec::as_slice).unwrap_or(&[]);
            let b = pass_b
                .as_ref()
                .and_then(|p| p.get(&cat))
                .map(Vec::as_slice)
                .unwrap_or(&[]);
            support.insert(cat, merge_unique(a, b, self.max_unique_chunks));
        }

        (support, second_query)
    }
}

/// Concatenates pass A before pass B, keeps the first occurrence of each
/// representative string, and truncates to `max` unique chunks.
fn merge_unique(pass_a: &[Chunk], pass_b: &[Chunk], max: usize) -> Vec<Chunk> {
    let mut seen = HashSet::new();
    let mut merged = Vec::new();
    for chunk in pass_a.iter().chain(pass_b) {
        if merged.len() >= max {
            break;
        }
        if seen.insert(chunk.dedup_key()) {
            merged.push(chunk.clone());
        }
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::Embedder;
    use crate::registry::{CategoryIndex, CorpusRegistry};
    use crate::vector_store::FlatIndex;
    use anyhow::Result;
    use async_trait::async_trait;
    use serde_json::json;

    struct KeywordEmbedder;

    /// Maps "murder"-flavored queries and everything else onto different
    /// axes so the two passes rank the corpus differently.
    #[async_trait]
    impl Embedder for KeywordEmbedder {
        async fn embed(&self, text: &str) -> Result<Vec<f32>> {
            if text.contains("murder") {
                Ok(vec![1.0, 0.0])
            } else {
                Ok(vec![0.0, 1.0])
            }
        }
    }

    struct FixedRewriter(&'static str);

    #[async_trait]
    impl QueryRewriter for FixedRewriter {
        async fn rewrite(&self, _case_text: &str) -> Result<String> {
            Ok(self.0.to_string())
        }
    }

    struct FailingRewriter;

    #[async_trait]
    impl QueryRewriter for FailingRewriter {
        async fn rewrite(&self, _case_text: &str) -> Result<String> {
            anyhow::bail!("rewriter quota exhausted")
        }
    }

    fn chunk(text: &str) -> Chunk {
        Chunk::new(Category::IpcSections, json!({ "text": text }))
    }

    fn engine(rewriter: Arc<dyn QueryRewriter>, max: usize) -> FusionEngine {
        let index =
            FlatIndex::from_vectors(2, vec![vec![1.0, 0.0], vec![0.0, 1.0], vec![0.6, 0.8]])
                .unwrap();
        let chunks = vec![
            json!({"text": "Section 302"}),
            json!({"text": "Section 378"}),
            json!({"text": "Section 304"}),
        ];
        let registry = Arc::new(CorpusRegistry::from_parts(vec![(
            Category::IpcSections,
            CategoryIndex { index, chunks },
        )]));
        let retriever = SimilarityRetriever::new(registry, Arc::new(KeywordEmbedder), 2);
        FusionEngine::new(retriever, rewriter, max)
    }

    #[test]
    fn merge_keeps_pass_a_priority_and_drops_duplicates() {
        let a = vec![chunk("Section 302"), chunk("Section 304")];
        let b = vec![chunk("Section 302"), chunk("Section 420")];
        let merged = merge_unique(&a, &b, 10);
        let keys: Vec<String> = merged.iter().map(Chunk::dedup_key).collect();
        assert_eq!(keys, vec!["Section 302", "Section 304", "Section 420"]);
    }

    #[test]
    fn merge_respects_the_unique_cap() {
        let a: Vec<Chunk> = (0..8).map(|i| chunk(&format!("A{i}"))).collect();
        let b: Vec<Chunk> = (0..8).map(|i| chunk(&format!("B{i}"))).collect();
        let merged = merge_unique(&a, &b, 10);
        assert_eq!(merged.len(), 10);
        assert_eq!(merged[9].dedup_key(), "B1");
    }

    #[tokio::test]
    async fn fuse_combines_both_passes_without_duplicates() {
        let engine = engine(Arc::new(FixedRewriter("murder, section 302")), 10);
        let (support, query) = engine.fuse("He stabbed the shopkeeper.", true).await;
        assert_eq!(query, "murder, section 302");

        let keys: Vec<String> = support
            .get(Category::IpcSections)
            .iter()
            .map(Chunk::dedup_key)
            .collect();
        // Pass A (non-murder axis) ranks 378 then 304; pass B (murder axis)
        // adds 302. The shared "Section 304" appears once, from pass A.
        assert_eq!(keys, vec!["Section 378", "Section 304", "Section 302"]);
    }

    #[tokio::test]
    async fn rewriter_failure_falls_back_to_case_text() {
        let engine = engine(Arc::new(FailingRewriter), 10);
        let (support, query) = engine.fuse("He stabbed the shopkeeper.", true).await;
        assert_eq!(query, "He stabbed the shopkeeper.");
        assert_eq!(support.get(Category::IpcSections).len(), 2);
    }

    #[tokio::test]
    async fn rewriting_disabled_is_single_pass() {
        let engine = engine(Arc::new(FixedRewriter("should never be used")), 10);
        let (support, query) = engine.fuse("A plain burglary case.", false).await;
        assert_eq!(query, "A plain burglary case.");
        assert_eq!(support.get(Category::IpcSections).len(), 2);
        // Unloaded categories are present and empty.
        assert!(support.get(Category::Constitution).is_empty());
    }

    #[tokio::test]
    async fn empty_registry_still_yields_well_formed_support() {
        let registry = Arc::new(CorpusRegistry::from_parts(Vec::new()));
        let retriever = SimilarityRetriever::new(registry, Arc::new(KeywordEmbedder), 5);
        let engine = FusionEngine::new(retriever, Arc::new(FailingRewriter), 10);
        let (support, _) = engine.fuse("Anything at all goes here.", true).await;
        assert_eq!(support.iter().count(), Category::ALL.len());
        assert_eq!(support.total_chunks(), 0);
    }
}
