//! Axum route handlers for the Interview API, the driver side of the orchestrator.
//!
//! The driver owns every `InterviewState` between calls, enforces the caller-side
//! preconditions (no empty submissions, nothing after the end) and renders views.

use axum::{
    extract::{Multipart, Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use bytes::Bytes;
use serde::Serialize;
use tokio::sync::MutexGuard;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::interview::session::SessionHandle;
use crate::interview::state::{Evaluation, HistoryEntry, ImageBlob, InterviewState, Submission};
use crate::interview::Orchestrator;
use crate::state::AppState;

/// Filename offered for every dataset download.
const DATASET_FILENAME: &str = "task_data.csv";

// ────────────────────────────────────────────────────────────────────────────
// Response types
// ────────────────────────────────────────────────────────────────────────────

/// What a client sees of an interview after each call.
#[derive(Debug, Serialize)]
pub struct InterviewView {
    pub session_id: Uuid,
    pub stage: &'static str,
    pub task_number: Option<usize>,
    pub task_count: usize,
    pub task_id: Option<String>,
    pub title: Option<String>,
    pub prompt: Option<String>,
    pub dataset_url: Option<String>,
    pub last_evaluation: Option<Evaluation>,
    /// Task ids answered so far, in completion order.
    pub completed: Vec<String>,
    pub history: Vec<HistoryEntry>,
    pub final_report: Option<String>,
}

impl InterviewView {
    fn build(session_id: Uuid, state: &InterviewState, orchestrator: &Orchestrator) -> Self {
        let title = state
            .current_task_id
            .as_deref()
            .and_then(|id| orchestrator.catalog().get(id).ok())
            .map(|task| task.title.clone());

        Self {
            session_id,
            stage: state.stage.name(),
            task_number: state.current_task_number(),
            task_count: orchestrator.task_count(),
            task_id: state.current_task_id.clone(),
            title,
            prompt: state
                .current_task_id
                .as_ref()
                .map(|_| state.current_task_prompt.clone()),
            dataset_url: state
                .current_task_dataset
                .as_ref()
                .map(|_| format!("/api/v1/interviews/{session_id}/dataset")),
            last_evaluation: state.last_evaluation.clone(),
            completed: state.completed_task_ids.clone(),
            history: state.history.clone(),
            final_report: state.final_report.clone(),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/interviews
///
/// Starts a new interview and presents its first task.
pub async fn handle_start_interview(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<InterviewView>), AppError> {
    let started = state.orchestrator.invoke(&InterviewState::new()).await?;
    let session_id = state.sessions.insert(started.clone()).await;
    info!(session_id = %session_id, task_id = ?started.current_task_id, "Interview started");

    Ok((
        StatusCode::CREATED,
        Json(InterviewView::build(session_id, &started, &state.orchestrator)),
    ))
}

/// GET /api/v1/interviews/:id
pub async fn handle_get_interview(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<InterviewView>, AppError> {
    let handle = find_session(&state, session_id).await?;
    let current = lock_idle(&handle, session_id)?;
    Ok(Json(InterviewView::build(
        session_id,
        &current,
        &state.orchestrator,
    )))
}

/// POST /api/v1/interviews/:id/submissions
///
/// Multipart fields: `explanation` (text) and `screenshot` (png/jpeg). At least one
/// must carry content. Evaluates the answer and returns either the next task or the
/// final report.
pub async fn handle_submit_answer(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    multipart: Multipart,
) -> Result<Json<InterviewView>, AppError> {
    let submission = read_submission(multipart).await?;
    if submission.is_empty() {
        return Err(AppError::Validation(
            "Please provide an explanation, a screenshot, or both.".to_string(),
        ));
    }

    let handle = find_session(&state, session_id).await?;
    let mut current = lock_idle(&handle, session_id)?;
    if current.is_finished() {
        return Err(AppError::Conflict(format!(
            "Interview {session_id} is already finished"
        )));
    }

    // The stored state is only replaced once the whole turn succeeds.
    let next = state
        .orchestrator
        .invoke(&current.with_submission(submission))
        .await?;
    *current = next;

    info!(
        session_id = %session_id,
        completed = current.completed_task_ids.len(),
        finished = current.is_finished(),
        "Submission processed"
    );

    Ok(Json(InterviewView::build(
        session_id,
        &current,
        &state.orchestrator,
    )))
}

/// GET /api/v1/interviews/:id/dataset
///
/// Downloads the current task's dataset as CSV.
pub async fn handle_download_dataset(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let handle = find_session(&state, session_id).await?;
    // Held through the read so a concurrent turn cannot discard the file underneath it.
    let current = lock_idle(&handle, session_id)?;
    let dataset = current
        .current_task_dataset
        .as_ref()
        .ok_or_else(|| AppError::NotFound("No dataset for the current task".to_string()))?;

    let data = tokio::fs::read(dataset.path()).await.map_err(|e| {
        AppError::Internal(anyhow::anyhow!(
            "Failed to read dataset {}: {e}",
            dataset.path().display()
        ))
    })?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{DATASET_FILENAME}\""),
            ),
        ],
        Bytes::from(data),
    ))
}

/// DELETE /api/v1/interviews/:id
///
/// Waits for a running turn to finish, then discards the interview and its dataset.
pub async fn handle_delete_interview(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let handle = state
        .sessions
        .remove(session_id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("Interview {session_id} not found")))?;

    let discarded = handle.lock().await;
    state.orchestrator.release(&discarded).await;
    info!(session_id = %session_id, "Interview discarded");
    Ok(StatusCode::NO_CONTENT)
}

async fn find_session(state: &AppState, session_id: Uuid) -> Result<SessionHandle, AppError> {
    state
        .sessions
        .get(session_id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("Interview {session_id} not found")))
}

/// Locks a session without queueing behind a turn that is still being evaluated.
fn lock_idle(
    handle: &SessionHandle,
    session_id: Uuid,
) -> Result<MutexGuard<'_, InterviewState>, AppError> {
    handle.try_lock().map_err(|_| {
        AppError::Busy(format!(
            "Interview {session_id} is processing a submission; try again shortly"
        ))
    })
}

/// Reads the multipart form into a submission. Unknown fields are ignored; a zero-byte
/// screenshot counts as no screenshot.
async fn read_submission(mut multipart: Multipart) -> Result<Submission, AppError> {
    let mut submission = Submission::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart body: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "explanation" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::Validation(format!("Invalid explanation: {e}")))?;
                submission.explanation = Some(text);
            }
            "screenshot" => {
                let media_type = normalize_image_type(field.content_type())?;
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(format!("Invalid screenshot: {e}")))?;
                if !data.is_empty() {
                    submission.image = Some(ImageBlob {
                        media_type: media_type.to_string(),
                        data: data.to_vec(),
                    });
                }
            }
            _ => {}
        }
    }

    Ok(submission)
}

fn normalize_image_type(content_type: Option<&str>) -> Result<&'static str, AppError> {
    match content_type {
        Some("image/png") => Ok("image/png"),
        Some("image/jpeg") | Some("image/jpg") => Ok("image/jpeg"),
        other => Err(AppError::Validation(format!(
            "Screenshot must be a PNG or JPEG image, got {}",
            other.unwrap_or("no content type")
        ))),
    }
}
