//! Domain types for the adjudication pipeline: retrieved chunks, verdicts,
//! the per-request SupportSet and the full outcome/trace record.

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;

use crate::category::Category;

/// An opaque unit of retrieved legal text. The payload is carried through
/// unmodified from the corpus file; only the dedup key interprets it.
#[derive(Debug, Clone)]
pub struct Chunk {
    pub category: Category,
    pub payload: serde_json::Value,
}

impl Chunk {
    pub fn new(category: Category, payload: serde_json::Value) -> Self {
        Self { category, payload }
    }

    /// Representative string used to identify "the same chunk" across the
    /// two retrieval passes. Preference order: `text`, then `description`,
    /// then `section_desc`, then the compact JSON form of the payload.
    pub fn dedup_key(&self) -> String {
        for field in ["text", "description", "section_desc"] {
            if let Some(s) = self.payload.get(field).and_then(|v| v.as_str()) {
                return s.to_string();
            }
        }
        self.payload.to_string()
    }

    /// Human-readable form rendered into the prompt listing.
    pub fn display_text(&self) -> String {
        match &self.payload {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

impl Serialize for Chunk {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.payload.serialize(serializer)
    }
}

/// Verdict label shared by the classifier and the reasoning engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Guilty,
    NotGuilty,
}

impl Verdict {
    pub fn as_str(self) -> &'static str {
        match self {
            Verdict::Guilty => "guilty",
            Verdict::NotGuilty => "not guilty",
        }
    }

    /// Interpretive gloss rendered into the prompt.
    pub fn outcome_gloss(self) -> &'static str {
        match self {
            Verdict::Guilty => "a loss for the person",
            Verdict::NotGuilty => "in favor of the person",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "guilty" => Some(Verdict::Guilty),
            "not guilty" | "not_guilty" => Some(Verdict::NotGuilty),
            _ => None,
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Verdict {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Whether the reasoning engine explicitly signalled a revised verdict.
/// `Changed` only on an affirmative "yes"; everything else is `NotChanged`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerdictChanged {
    Changed,
    NotChanged,
}

impl VerdictChanged {
    pub fn as_str(self) -> &'static str {
        match self {
            VerdictChanged::Changed => "changed",
            VerdictChanged::NotChanged => "not changed",
        }
    }

    pub fn is_changed(self) -> bool {
        matches!(self, VerdictChanged::Changed)
    }
}

impl Serialize for VerdictChanged {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Per-category, order-preserving chunk lists backing an adjudication.
/// Every enumerated category key is always present; a category that was
/// not loaded or retrieved nothing maps to an empty list.
#[derive(Debug, Clone, Default)]
pub struct SupportSet {
    by_category: HashMap<Category, Vec<Chunk>>,
}

impl SupportSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, category: Category, chunks: Vec<Chunk>) {
        self.by_category.insert(category, chunks);
    }

    pub fn get(&self, category: Category) -> &[Chunk] {
        self.by_category
            .get(&category)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Iterates categories in the fixed `Category::ALL` order.
    pub fn iter(&self) -> impl Iterator<Item = (Category, &[Chunk])> {
        Category::ALL.into_iter().map(|cat| (cat, self.get(cat)))
    }

    pub fn total_chunks(&self) -> usize {
        Category::ALL.iter().map(|c| self.get(*c).len()).sum()
    }
}

impl Serialize for SupportSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(Category::ALL.len()))?;
        for (cat, chunks) in self.iter() {
            map.serialize_entry(cat.name(), chunks)?;
        }
        map.end()
    }
}

/// Inputs to one adjudication run.
#[derive(Debug, Clone)]
pub struct AdjudicationRequest {
    pub case_text: String,
    pub initial_verdict: Verdict,
    pub initial_confidence: f64,
    pub use_query_rewrite: bool,
}

/// The single response/trace record produced by the orchestrator. On
/// internal failure `error` is set and every derived field is `None`;
/// the orchestrator never raises to its caller.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdjudicationOutcome {
    pub input_text: String,
    pub initial_verdict: Verdict,
    pub initial_confidence: f64,
    pub search_query: Option<String>,
    pub support: Option<SupportSet>,
    pub prompt: Option<String>,
    pub explanation: Option<String>,
    pub final_verdict: Option<Verdict>,
    pub verdict_changed: Option<VerdictChanged>,
    pub error: Option<String>,
}

impl AdjudicationOutcome {
    /// Error outcome: input echoes only, everything derived nulled out.
    pub fn failure(request: &AdjudicationRequest, error: String) -> Self {
        Self {
            input_text: request.case_text.clone(),
            initial_verdict: request.initial_verdict,
            initial_confidence: request.initial_confidence,
            search_query: None,
            support: None,
            prompt: None,
            explanation: None,
            final_verdict: None,
            verdict_changed: None,
            error: Some(error),
        }
    }
}
