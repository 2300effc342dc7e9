//! Initial verdict classifier seam.
//!
//! The fine-tuned model that produces the initial verdict lives outside
//! this service; what ships here is the deterministic text-hash stand-in
//! used until the real artifact is wired in, behind the same trait the
//! orchestrator consumes.

use async_trait::async_trait;
use std::hash::{DefaultHasher, Hash, Hasher};

use crate::models::Verdict;

#[async_trait]
pub trait VerdictClassifier: Send + Sync {
    /// `classify(text) -> (label, confidence in [0, 1])`.
    async fn classify(&self, case_text: &str) -> (Verdict, f64);

    /// Whether a real model artifact is loaded. Reported on the status
    /// route; the hash stand-in always answers false.
    fn is_model_loaded(&self) -> bool;
}

/// Deterministic placeholder: verdict from text-hash parity, confidence
/// spread over [0.5, 1.0). Stable across runs for the same input.
#[derive(Debug, Default, Clone)]
pub struct HashClassifier;

impl HashClassifier {
    fn text_hash(case_text: &str) -> u64 {
        let mut hasher = DefaultHasher::new();
        case_text.hash(&mut hasher);
        hasher.finish()
    }
}

#[async_trait]
impl VerdictClassifier for HashClassifier {
    async fn classify(&self, case_text: &str) -> (Verdict, f64) {
        let hash = Self::text_hash(case_text);
        let verdict = if hash % 2 == 1 {
            Verdict::Guilty
        } else {
            Verdict::NotGuilty
        };
        let confidence = 0.5 + (hash % 100) as f64 / 200.0;
        (verdict, confidence)
    }

    fn is_model_loaded(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn classification_is_deterministic() {
        let clf = HashClassifier;
        let a = clf.classify("The accused struck the victim.").await;
        let b = clf.classify("The accused struck the victim.").await;
        assert_eq!(a.0, b.0);
        assert_eq!(a.1, b.1);
    }

    #[tokio::test]
    async fn confidence_stays_in_range() {
        let clf = HashClassifier;
        for text in ["a", "some longer case narrative", ""] {
            let (_, confidence) = clf.classify(text).await;
            assert!((0.5..1.0).contains(&confidence));
        }
    }
}
