use std::sync::Arc;

use crate::interview::{Orchestrator, SessionStore};

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Built once at startup with the long-lived LLM-backed collaborators.
    pub orchestrator: Arc<Orchestrator>,
    /// Live interviews keyed by session id. The driver is their only owner.
    pub sessions: Arc<SessionStore>,
}
