use std::sync::Arc;

use crate::classifier::VerdictClassifier;
use crate::config::AppConfig;
use crate::orchestrator::Adjudicator;
use crate::registry::CorpusRegistry;

/// Shared application state: read-only after startup, cheap to clone into
/// handlers. No per-request mutability anywhere.
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub registry: Arc<CorpusRegistry>,
    pub classifier: Arc<dyn VerdictClassifier>,
    pub adjudicator: Arc<Adjudicator>,
    /// Whether the reasoning engine has credentials configured.
    pub reasoning_configured: bool,
}
