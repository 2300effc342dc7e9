//! The closed set of legal corpus categories.
//!
//! Every retrieval result map and every SupportSet is keyed by this enum,
//! and `Category::ALL` fixes the iteration order used when rendering the
//! adjudication prompt.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the six legal source types the corpus registry can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Constitution,
    IpcSections,
    IpcCase,
    Statutes,
    QaTexts,
    CaseLaw,
}

impl Category {
    /// Fixed iteration order. Prompt sections and response maps follow it.
    pub const ALL: [Category; 6] = [
        Category::Constitution,
        Category::IpcSections,
        Category::IpcCase,
        Category::Statutes,
        Category::QaTexts,
        Category::CaseLaw,
    ];

    /// Wire name used in JSON responses and chunk corpora.
    pub fn name(self) -> &'static str {
        match self {
            Category::Constitution => "constitution",
            Category::IpcSections => "ipcSections",
            Category::IpcCase => "ipcCase",
            Category::Statutes => "statutes",
            Category::QaTexts => "qaTexts",
            Category::CaseLaw => "caseLaw",
        }
    }

    /// Section heading used in the adjudication prompt.
    pub fn heading(self) -> &'static str {
        match self {
            Category::Constitution => "Constitution Articles",
            Category::IpcSections => "IPC Sections",
            Category::IpcCase => "IPC Case Law",
            Category::Statutes => "Statutes",
            Category::QaTexts => "QA Texts",
            Category::CaseLaw => "General Case Law",
        }
    }

    /// File names of the `(index, chunks)` pair under the corpus base dir.
    pub fn file_names(self) -> (&'static str, &'static str) {
        match self {
            Category::Constitution => ("constitution_vectors.json", "constitution_chunks.json"),
            Category::IpcSections => ("ipc_vectors.json", "ipc_chunks.json"),
            Category::IpcCase => ("ipc_case_vectors.json", "ipc_case_chunks.json"),
            Category::Statutes => ("statute_vectors.json", "statute_chunks.json"),
            Category::QaTexts => ("qa_vectors.json", "qa_chunks.json"),
            Category::CaseLaw => ("case_law_vectors.json", "case_law_chunks.json"),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
