use std::sync::Arc;

use crate::analysis::flows::AnalysisFlows;
use crate::history::gateway::PersistenceGateway;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub flows: Arc<AnalysisFlows>,
    pub history: Arc<PersistenceGateway>,
}
