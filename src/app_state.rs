use std::sync::Arc;

use crate::services::{job_store::JobStore, orchestrator::Orchestrator};

/// Shared application state passed to all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub jobs: Arc<JobStore>,
    pub orchestrator: Arc<Orchestrator>,
}

impl AppState {
    pub fn new(orchestrator: Orchestrator) -> Self {
        Self {
            jobs: Arc::clone(orchestrator.store()),
            orchestrator: Arc::new(orchestrator),
        }
    }
}
