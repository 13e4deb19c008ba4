//! The interview data model threaded through every orchestrator call.

use serde::{Deserialize, Serialize};

use crate::tasks::DatasetRef;

/// Highest score the evaluator may award for a single task.
pub const MAX_TASK_SCORE: u32 = 10;

/// Where an interview is in its lifecycle.
///
/// `AwaitingAnswer` and `Finished` are resting stages: the orchestrator hands control back
/// to the caller there. Every other stage is transient and is advanced by `step`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "stage", rename_all = "snake_case")]
pub enum Stage {
    #[default]
    Fresh,
    Selecting,
    Presenting {
        task_id: String,
    },
    AwaitingAnswer,
    Evaluating,
    Reporting,
    Finished,
}

impl Stage {
    pub fn is_resting(&self) -> bool {
        matches!(self, Stage::AwaitingAnswer | Stage::Finished)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Stage::Fresh => "fresh",
            Stage::Selecting => "selecting",
            Stage::Presenting { .. } => "presenting",
            Stage::AwaitingAnswer => "awaiting_answer",
            Stage::Evaluating => "evaluating",
            Stage::Reporting => "reporting",
            Stage::Finished => "finished",
        }
    }
}

/// A screenshot attached to a submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageBlob {
    /// `image/png` or `image/jpeg`.
    pub media_type: String,
    pub data: Vec<u8>,
}

/// A candidate's answer to the current task.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Submission {
    pub explanation: Option<String>,
    pub image: Option<ImageBlob>,
}

impl Submission {
    pub fn text(explanation: impl Into<String>) -> Self {
        Self {
            explanation: Some(explanation.into()),
            image: None,
        }
    }

    /// The explanation, if it holds anything besides whitespace.
    pub fn explanation_text(&self) -> Option<&str> {
        self.explanation
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }

    pub fn has_image(&self) -> bool {
        self.image.as_ref().is_some_and(|img| !img.data.is_empty())
    }

    /// True when neither a non-blank explanation nor an image is present.
    pub fn is_empty(&self) -> bool {
        self.explanation_text().is_none() && !self.has_image()
    }
}

/// Score and feedback for one submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Evaluation {
    pub score: u32,
    pub feedback: String,
}

impl Evaluation {
    pub fn new(score: u32, feedback: impl Into<String>) -> Self {
        Self {
            score: score.min(MAX_TASK_SCORE),
            feedback: feedback.into(),
        }
    }

    /// Substituted when the submission held neither text nor image.
    pub fn no_submission() -> Self {
        Self::new(0, "No submission provided")
    }

    /// Substituted when the evaluator failed or answered with garbage.
    pub fn evaluation_error() -> Self {
        Self::new(0, "Evaluation error")
    }
}

/// Outcome of checking a stated number against a task's reference answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "verdict", rename_all = "snake_case")]
pub enum Verdict {
    Correct,
    Incorrect { expected: f64 },
    NotApplicable,
}

/// Permanent record of one completed task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub task_id: String,
    pub title: String,
    pub evaluation: Evaluation,
    pub verification: Verdict,
}

/// The single value threaded through every orchestrator call.
///
/// Invariants kept by the orchestrator:
/// - `completed_task_ids` and `history` have equal length and matching order.
/// - `final_report` is set once, on entering `Finished`, and never cleared.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InterviewState {
    pub stage: Stage,
    pub current_task_id: Option<String>,
    pub current_task_prompt: String,
    pub current_task_dataset: Option<DatasetRef>,
    /// Reference answer computed from the current dataset, for tasks that have one.
    pub current_expected_answer: Option<f64>,
    pub pending_submission: Option<Submission>,
    pub last_evaluation: Option<Evaluation>,
    pub completed_task_ids: Vec<String>,
    pub history: Vec<HistoryEntry>,
    pub final_report: Option<String>,
}

impl InterviewState {
    /// A fresh interview with every optional field empty.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy carrying `submission` for the next call.
    pub fn with_submission(&self, submission: Submission) -> Self {
        Self {
            pending_submission: Some(submission),
            ..self.clone()
        }
    }

    pub fn is_finished(&self) -> bool {
        self.stage == Stage::Finished
    }

    /// 1-based number of the task currently presented.
    pub fn current_task_number(&self) -> Option<usize> {
        self.current_task_id
            .as_ref()
            .map(|_| self.completed_task_ids.len() + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_awaiting_and_finished_rest() {
        assert!(Stage::AwaitingAnswer.is_resting());
        assert!(Stage::Finished.is_resting());
        assert!(!Stage::Fresh.is_resting());
        assert!(!Stage::Selecting.is_resting());
        assert!(!Stage::Presenting {
            task_id: "t1".to_string()
        }
        .is_resting());
        assert!(!Stage::Evaluating.is_resting());
        assert!(!Stage::Reporting.is_resting());
    }

    #[test]
    fn test_blank_explanation_without_image_is_empty() {
        assert!(Submission::text("   ").is_empty());
        assert!(Submission::default().is_empty());
        assert!(!Submission::text("42").is_empty());
    }

    #[test]
    fn test_image_only_submission_is_not_empty() {
        let submission = Submission {
            explanation: None,
            image: Some(ImageBlob {
                media_type: "image/png".to_string(),
                data: vec![0x89, 0x50],
            }),
        };
        assert!(!submission.is_empty());
    }

    #[test]
    fn test_zero_byte_image_does_not_count() {
        let submission = Submission {
            explanation: Some(String::new()),
            image: Some(ImageBlob {
                media_type: "image/png".to_string(),
                data: vec![],
            }),
        };
        assert!(submission.is_empty());
    }

    #[test]
    fn test_evaluation_score_is_capped() {
        assert_eq!(Evaluation::new(14, "wow").score, MAX_TASK_SCORE);
    }

    #[test]
    fn test_stage_serializes_with_tag() {
        let json = serde_json::to_value(Stage::Presenting {
            task_id: "task_3".to_string(),
        })
        .unwrap();
        assert_eq!(json["stage"], "presenting");
        assert_eq!(json["task_id"], "task_3");
    }

    #[test]
    fn test_with_submission_leaves_original_untouched() {
        let state = InterviewState::new();
        let next = state.with_submission(Submission::text("42"));
        assert!(state.pending_submission.is_none());
        assert_eq!(next.pending_submission, Some(Submission::text("42")));
    }
}
