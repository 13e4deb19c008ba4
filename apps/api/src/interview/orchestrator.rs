//! Interview Orchestrator: the state machine that runs an interview.
//!
//! Flow per caller turn: route the entry → `step` until a resting stage.
//!
//!   Fresh ─▶ Selecting ─▶ Presenting ─▶ AwaitingAnswer
//!               │  ▲                        │ (submission)
//!               │  └──── Evaluating ◀───────┘
//!               ▼            │ (quota reached)
//!           Reporting ◀──────┘
//!               │
//!               ▼
//!           Finished
//!
//! The orchestrator holds no per-interview memory. Every call takes the caller's state,
//! works on a copy, and returns the next state; on error the caller keeps its own copy.
//! A dataset is discarded only after a successful turn has replaced it, so a failed turn
//! never leaves the caller pointing at a deleted file.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::config::DEFAULT_TASK_COUNT;
use crate::errors::InterviewError;
use crate::interview::evaluator::Evaluator;
use crate::interview::report::{render_report, tally, ReportSynthesizer, NARRATIVE_UNAVAILABLE};
use crate::interview::selection::{RandomPicker, TaskPicker};
use crate::interview::state::{Evaluation, HistoryEntry, InterviewState, Stage};
use crate::interview::verify;
use crate::tasks::{DatasetProvider, DatasetRef, TaskCatalog};

#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Completed tasks after which the interview ends.
    pub task_count: usize,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            task_count: DEFAULT_TASK_COUNT,
        }
    }
}

/// How an incoming state enters the machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Select,
    Evaluate,
    /// Continue from a transient stage left by an interrupted call.
    Resume,
    /// Nothing to do: finished, or awaiting an answer that was not supplied.
    Idle,
}

/// Decides which step a caller's state starts from.
pub fn route(state: &InterviewState) -> Route {
    if state.final_report.is_some() {
        return Route::Idle;
    }
    match state.stage {
        Stage::Fresh => Route::Select,
        Stage::AwaitingAnswer if state.pending_submission.is_some() => Route::Evaluate,
        Stage::AwaitingAnswer | Stage::Finished => Route::Idle,
        Stage::Selecting | Stage::Presenting { .. } | Stage::Evaluating | Stage::Reporting => {
            Route::Resume
        }
    }
}

/// Runs interviews against a shared task catalog and long-lived collaborators.
pub struct Orchestrator {
    catalog: Arc<TaskCatalog>,
    evaluator: Arc<dyn Evaluator>,
    synthesizer: Arc<dyn ReportSynthesizer>,
    datasets: Arc<dyn DatasetProvider>,
    picker: Arc<dyn TaskPicker>,
    config: OrchestratorConfig,
}

impl Orchestrator {
    /// Builds an orchestrator that picks tasks uniformly at random.
    pub fn new(
        catalog: Arc<TaskCatalog>,
        evaluator: Arc<dyn Evaluator>,
        synthesizer: Arc<dyn ReportSynthesizer>,
        datasets: Arc<dyn DatasetProvider>,
        config: OrchestratorConfig,
    ) -> Self {
        Self {
            catalog,
            evaluator,
            synthesizer,
            datasets,
            picker: Arc::new(RandomPicker),
            config,
        }
    }

    /// Replaces the selection policy.
    pub fn with_picker(mut self, picker: Arc<dyn TaskPicker>) -> Self {
        self.picker = picker;
        self
    }

    pub fn catalog(&self) -> &TaskCatalog {
        &self.catalog
    }

    pub fn task_count(&self) -> usize {
        self.config.task_count
    }

    /// Advances the interview by one caller turn.
    ///
    /// Starts, hands out the next task, or consumes a pending submission depending on
    /// the state, then steps until the interview needs the caller again. The dataset of
    /// a task that was answered during the turn is discarded.
    pub async fn invoke(&self, state: &InterviewState) -> Result<InterviewState, InterviewError> {
        let mut next = state.clone();
        match route(&next) {
            Route::Select => next.stage = Stage::Selecting,
            Route::Evaluate => next.stage = Stage::Evaluating,
            Route::Resume => debug!(stage = next.stage.name(), "Resuming transient stage"),
            Route::Idle => {
                if next.final_report.is_none() {
                    warn!("Invoked while awaiting an answer without a submission; nothing to do");
                }
                return Ok(next);
            }
        }

        while !next.stage.is_resting() {
            next = self.step(next).await?;
        }

        if let Some(previous) = &state.current_task_dataset {
            if next.current_task_dataset.as_ref() != Some(previous) {
                self.discard(previous).await;
            }
        }
        Ok(next)
    }

    /// Frees what an interview that is being thrown away still holds.
    pub async fn release(&self, state: &InterviewState) {
        if let Some(dataset) = &state.current_task_dataset {
            self.discard(dataset).await;
        }
    }

    async fn discard(&self, dataset: &DatasetRef) {
        if let Err(e) = self.datasets.discard(dataset).await {
            warn!(path = %dataset.path().display(), "Failed to discard dataset: {e}");
        }
    }

    /// Performs exactly one transition.
    pub async fn step(&self, state: InterviewState) -> Result<InterviewState, InterviewError> {
        match state.stage.clone() {
            Stage::Fresh => Ok(InterviewState {
                stage: Stage::Selecting,
                ..state
            }),
            Stage::Selecting => Ok(self.select(state)),
            Stage::Presenting { task_id } => self.present(state, &task_id).await,
            Stage::AwaitingAnswer if state.pending_submission.is_some() => Ok(InterviewState {
                stage: Stage::Evaluating,
                ..state
            }),
            Stage::AwaitingAnswer | Stage::Finished => Ok(state),
            Stage::Evaluating => self.evaluate(state).await,
            Stage::Reporting => Ok(self.report(state).await),
        }
    }

    /// Whether `completed` tasks meet the interview quota.
    pub fn is_complete(&self, completed: usize) -> bool {
        completed >= self.config.task_count
    }

    fn select(&self, mut state: InterviewState) -> InterviewState {
        let uncompleted: Vec<String> = self
            .catalog
            .task_ids()
            .iter()
            .filter(|id| !state.completed_task_ids.contains(id))
            .cloned()
            .collect();

        state.stage = match self.picker.pick(&uncompleted) {
            Some(task_id) => {
                debug!(task_id = %task_id, remaining = uncompleted.len(), "Task selected");
                Stage::Presenting { task_id }
            }
            None => {
                info!(
                    completed = state.completed_task_ids.len(),
                    "Task catalog exhausted; moving to report"
                );
                Stage::Reporting
            }
        };
        state
    }

    async fn present(
        &self,
        mut state: InterviewState,
        task_id: &str,
    ) -> Result<InterviewState, InterviewError> {
        let task = self.catalog.get(task_id)?;
        let table = (task.dataset)();
        let dataset = self.datasets.provide(&task.id, &table).await?;
        let expected = task.reference_answer.and_then(|answer| answer(&table));

        info!(
            task_id = %task.id,
            task_number = state.completed_task_ids.len() + 1,
            "Presenting task"
        );

        state.current_task_id = Some(task.id.clone());
        state.current_task_prompt = task.prompt.clone();
        state.current_task_dataset = Some(dataset);
        state.current_expected_answer = expected;
        state.pending_submission = None;
        state.last_evaluation = None;
        state.stage = Stage::AwaitingAnswer;
        Ok(state)
    }

    async fn evaluate(&self, mut state: InterviewState) -> Result<InterviewState, InterviewError> {
        let task_id = state.current_task_id.clone().ok_or_else(|| {
            InterviewError::InconsistentState("evaluating without a current task".to_string())
        })?;
        let task = self.catalog.get(&task_id)?;
        let submission = state.pending_submission.take().unwrap_or_default();

        let evaluation = if submission.is_empty() {
            warn!(task_id = %task_id, "Empty submission recorded with zero score");
            Evaluation::no_submission()
        } else {
            match self.evaluator.evaluate(&task.rubric, &submission).await {
                Ok(evaluation) => evaluation,
                Err(e) => {
                    warn!(task_id = %task_id, "Evaluation failed, substituting zero score: {e}");
                    Evaluation::evaluation_error()
                }
            }
        };

        let verification = verify::check(
            state.current_expected_answer,
            submission.explanation_text(),
        );

        info!(
            task_id = %task_id,
            score = evaluation.score,
            verification = ?verification,
            "Submission evaluated"
        );

        state.history.push(HistoryEntry {
            task_id: task_id.clone(),
            title: task.title.clone(),
            evaluation: evaluation.clone(),
            verification,
        });
        state.completed_task_ids.push(task_id);
        state.last_evaluation = Some(evaluation);
        state.current_task_id = None;
        state.current_task_prompt.clear();
        state.current_task_dataset = None;
        state.current_expected_answer = None;

        state.stage = if self.is_complete(state.completed_task_ids.len()) {
            Stage::Reporting
        } else {
            Stage::Selecting
        };
        Ok(state)
    }

    async fn report(&self, mut state: InterviewState) -> InterviewState {
        if state.final_report.is_none() {
            let (score, max_score) = tally(&state.history);
            let narrative = match self
                .synthesizer
                .summarize(score, max_score, &state.history)
                .await
            {
                Ok(narrative) => narrative,
                Err(e) => {
                    warn!("Report synthesis failed, using placeholder: {e}");
                    NARRATIVE_UNAVAILABLE.to_string()
                }
            };
            info!(score, max_score, "Interview finished");
            state.final_report = Some(render_report(score, max_score, &narrative));
        }
        state.pending_submission = None;
        state.stage = Stage::Finished;
        state
    }
}
