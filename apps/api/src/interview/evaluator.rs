//! Evaluator: scores a submission against a task rubric.
//!
//! Implementations report failure through `EvaluationFailure`; the orchestrator turns
//! any failure into a zero-score sentinel so the interview always continues.

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::interview::prompts::{
    EVALUATION_PROMPT_TEMPLATE, EVALUATION_ROLE, SUBMISSION_IMAGE_ONLY,
    SUBMISSION_TEXT_AND_IMAGE, SUBMISSION_TEXT_ONLY,
};
use crate::interview::state::{Evaluation, Submission, MAX_TASK_SCORE};
use crate::llm_client::prompts::JSON_ONLY_SYSTEM;
use crate::llm_client::{parse_json_reply, ImageInput, LlmClient, LlmError};
use crate::tasks::Rubric;

#[derive(Debug, Error)]
pub enum EvaluationFailure {
    #[error("evaluator unavailable: {0}")]
    Llm(#[from] LlmError),

    #[error("malformed evaluation: {0}")]
    Malformed(String),

    #[error("submission has neither explanation nor image")]
    NoSubmission,
}

/// Scores one submission. Carried by the orchestrator as `Arc<dyn Evaluator>`.
#[async_trait]
pub trait Evaluator: Send + Sync {
    async fn evaluate(
        &self,
        rubric: &Rubric,
        submission: &Submission,
    ) -> Result<Evaluation, EvaluationFailure>;
}

/// Reply shape requested from the model. `score` is read as a float because models
/// occasionally answer `7.5` or `"8"`.
#[derive(Debug, Deserialize)]
struct RawEvaluation {
    score: serde_json::Value,
    #[serde(default)]
    feedback: String,
}

impl TryFrom<RawEvaluation> for Evaluation {
    type Error = EvaluationFailure;

    fn try_from(raw: RawEvaluation) -> Result<Self, Self::Error> {
        let score = match &raw.score {
            serde_json::Value::Number(n) => n.as_f64(),
            serde_json::Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        }
        .filter(|s| s.is_finite())
        .ok_or_else(|| EvaluationFailure::Malformed(format!("score {}", raw.score)))?;

        let score = score.round().clamp(0.0, MAX_TASK_SCORE as f64) as u32;
        Ok(Evaluation::new(score, raw.feedback))
    }
}

/// Evaluator backed by the shared `LlmClient`.
pub struct LlmEvaluator {
    llm: LlmClient,
}

impl LlmEvaluator {
    pub fn new(llm: LlmClient) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl Evaluator for LlmEvaluator {
    async fn evaluate(
        &self,
        rubric: &Rubric,
        submission: &Submission,
    ) -> Result<Evaluation, EvaluationFailure> {
        let prompt = build_evaluation_prompt(rubric, submission)?;
        let image = submission
            .image
            .as_ref()
            .filter(|_| submission.has_image())
            .map(|img| ImageInput {
                media_type: &img.media_type,
                data: &img.data,
            });

        info!(
            has_text = submission.explanation_text().is_some(),
            has_image = image.is_some(),
            "Evaluating submission"
        );
        let system = format!("{EVALUATION_ROLE} {JSON_ONLY_SYSTEM}");
        let text = self.llm.call_text(&prompt, &system, image).await?;
        debug!("Raw evaluator reply: {text}");

        let raw: RawEvaluation = parse_json_reply(&text)?;
        Evaluation::try_from(raw)
    }
}

/// Builds the evaluation prompt for whichever parts the submission carries.
fn build_evaluation_prompt(
    rubric: &Rubric,
    submission: &Submission,
) -> Result<String, EvaluationFailure> {
    let block = match (submission.explanation_text(), submission.has_image()) {
        (Some(text), true) => SUBMISSION_TEXT_AND_IMAGE.replace("{explanation}", text),
        (Some(text), false) => SUBMISSION_TEXT_ONLY.replace("{explanation}", text),
        (None, true) => SUBMISSION_IMAGE_ONLY.to_string(),
        (None, false) => return Err(EvaluationFailure::NoSubmission),
    };

    let concepts = serde_json::to_string(&rubric.key_concepts)
        .map_err(|e| EvaluationFailure::Malformed(e.to_string()))?;

    Ok(EVALUATION_PROMPT_TEMPLATE
        .replace("{key_concepts}", &concepts)
        .replace("{submission}", &block))
}
