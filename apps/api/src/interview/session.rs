//! In-memory store of live interview sessions.
//!
//! Each session owns one `InterviewState` behind its own async mutex, so a long
//! evaluation in one interview never blocks another. Sessions remember when they were
//! last looked up; `spawn_idle_sweeper` evicts the ones nobody has touched for a while.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, info};
use uuid::Uuid;

use crate::interview::state::InterviewState;
use crate::interview::Orchestrator;

pub type SessionHandle = Arc<Mutex<InterviewState>>;

struct Session {
    handle: SessionHandle,
    last_touched: DateTime<Utc>,
}

#[derive(Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<Uuid, Session>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `state` under a new session id.
    pub async fn insert(&self, state: InterviewState) -> Uuid {
        let id = Uuid::new_v4();
        self.sessions.write().await.insert(
            id,
            Session {
                handle: Arc::new(Mutex::new(state)),
                last_touched: Utc::now(),
            },
        );
        id
    }

    /// Looks up a session and marks it as recently used.
    pub async fn get(&self, id: Uuid) -> Option<SessionHandle> {
        let mut sessions = self.sessions.write().await;
        let session = sessions.get_mut(&id)?;
        session.last_touched = Utc::now();
        Some(session.handle.clone())
    }

    /// Discards a session, handing back its state for cleanup.
    pub async fn remove(&self, id: Uuid) -> Option<SessionHandle> {
        self.sessions
            .write()
            .await
            .remove(&id)
            .map(|session| session.handle)
    }

    /// Removes every session last touched before `now - max_idle`.
    pub async fn evict_idle(&self, max_idle: Duration, now: DateTime<Utc>) -> Vec<SessionHandle> {
        let cutoff = now - max_idle;
        let mut sessions = self.sessions.write().await;
        let stale: Vec<Uuid> = sessions
            .iter()
            .filter(|(_, session)| session.last_touched < cutoff)
            .map(|(id, _)| *id)
            .collect();

        stale
            .into_iter()
            .filter_map(|id| {
                debug!(session_id = %id, "Evicting idle interview");
                sessions.remove(&id).map(|session| session.handle)
            })
            .collect()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }
}

/// Evicts idle sessions and releases what they hold. Returns how many were evicted.
pub async fn sweep_idle(
    sessions: &SessionStore,
    orchestrator: &Orchestrator,
    max_idle: Duration,
) -> usize {
    let evicted = sessions.evict_idle(max_idle, Utc::now()).await;
    for handle in &evicted {
        // Waits out any turn still running on the evicted session.
        let state = handle.lock().await;
        orchestrator.release(&state).await;
    }
    evicted.len()
}

/// Runs `sweep_idle` every `every` for the lifetime of the process.
pub fn spawn_idle_sweeper(
    sessions: Arc<SessionStore>,
    orchestrator: Arc<Orchestrator>,
    max_idle: Duration,
    every: std::time::Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        loop {
            ticker.tick().await;
            let evicted = sweep_idle(&sessions, &orchestrator, max_idle).await;
            if evicted > 0 {
                let remaining = sessions.len().await;
                info!(
                    evicted,
                    remaining,
                    "Idle interviews evicted"
                );
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    use crate::interview::evaluator::{EvaluationFailure, Evaluator};
    use crate::interview::report::ReportSynthesizer;
    use crate::interview::state::{Evaluation, HistoryEntry, Stage, Submission};
    use crate::interview::OrchestratorConfig;
    use crate::llm_client::LlmError;
    use crate::tasks::{CsvDatasetStore, Rubric, TaskCatalog};

    struct NeverEvaluator;

    #[async_trait]
    impl Evaluator for NeverEvaluator {
        async fn evaluate(
            &self,
            _rubric: &Rubric,
            _submission: &Submission,
        ) -> Result<Evaluation, EvaluationFailure> {
            Err(EvaluationFailure::NoSubmission)
        }
    }

    struct NeverSynthesizer;

    #[async_trait]
    impl ReportSynthesizer for NeverSynthesizer {
        async fn summarize(
            &self,
            _score: u32,
            _max_score: u32,
            _history: &[HistoryEntry],
        ) -> Result<String, LlmError> {
            Err(LlmError::EmptyContent)
        }
    }

    async fn backdate(store: &SessionStore, id: Uuid, by: Duration) {
        let mut sessions = store.sessions.write().await;
        let session = sessions.get_mut(&id).unwrap();
        session.last_touched = session.last_touched - by;
    }

    #[tokio::test]
    async fn test_insert_get_remove() {
        let store = SessionStore::new();
        let id = store.insert(InterviewState::new()).await;

        let handle = store.get(id).await.unwrap();
        handle.lock().await.stage = Stage::Finished;
        assert_eq!(store.get(id).await.unwrap().lock().await.stage, Stage::Finished);

        assert!(store.remove(id).await.is_some());
        assert!(store.remove(id).await.is_none());
        assert!(store.get(id).await.is_none());
    }

    #[tokio::test]
    async fn test_sessions_are_independent() {
        let store = SessionStore::new();
        let a = store.insert(InterviewState::new()).await;
        let b = store.insert(InterviewState::new()).await;
        assert_ne!(a, b);
        assert_eq!(store.len().await, 2);

        store.get(a).await.unwrap().lock().await.stage = Stage::Finished;
        assert_eq!(store.get(b).await.unwrap().lock().await.stage, Stage::Fresh);
    }

    #[tokio::test]
    async fn test_evict_idle_removes_only_stale_sessions() {
        let store = SessionStore::new();
        let stale = store.insert(InterviewState::new()).await;
        let fresh = store.insert(InterviewState::new()).await;
        backdate(&store, stale, Duration::hours(2)).await;

        let evicted = store.evict_idle(Duration::minutes(30), Utc::now()).await;

        assert_eq!(evicted.len(), 1);
        assert!(store.get(stale).await.is_none());
        assert!(store.get(fresh).await.is_some());
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_get_refreshes_last_touched() {
        let store = SessionStore::new();
        let id = store.insert(InterviewState::new()).await;
        backdate(&store, id, Duration::hours(2)).await;

        store.get(id).await.unwrap();
        let evicted = store.evict_idle(Duration::minutes(30), Utc::now()).await;

        assert!(evicted.is_empty());
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_sweep_releases_evicted_datasets() {
        let dir = tempfile::tempdir().unwrap();
        let orchestrator = Orchestrator::new(
            Arc::new(TaskCatalog::builtin()),
            Arc::new(NeverEvaluator),
            Arc::new(NeverSynthesizer),
            Arc::new(CsvDatasetStore::new(dir.path()).unwrap()),
            OrchestratorConfig::default(),
        );
        let store = SessionStore::new();

        let started = orchestrator.invoke(&InterviewState::new()).await.unwrap();
        let dataset = started.current_task_dataset.clone().unwrap();
        assert!(dataset.path().exists());

        let id = store.insert(started).await;
        backdate(&store, id, Duration::hours(2)).await;

        let evicted = sweep_idle(&store, &orchestrator, Duration::minutes(30)).await;

        assert_eq!(evicted, 1);
        assert!(!dataset.path().exists());
        assert_eq!(store.len().await, 0);
    }
}
