//! Final report assembly.
//!
//! The numeric tally is computed here; only the narrative comes from the synthesizer.

use async_trait::async_trait;
use tracing::info;

use crate::interview::prompts::{REPORT_PROMPT_TEMPLATE, REPORT_SYSTEM};
use crate::interview::state::{HistoryEntry, MAX_TASK_SCORE};
use crate::llm_client::prompts::NO_CORRESPONDENCE_INSTRUCTION;
use crate::llm_client::{LlmClient, LlmError};

/// Shown in place of the narrative when the synthesizer fails.
pub const NARRATIVE_UNAVAILABLE: &str = "Summary unavailable: the report could not be generated.";

/// Writes the narrative part of the final report.
#[async_trait]
pub trait ReportSynthesizer: Send + Sync {
    /// Returns markdown with three sections: overall performance, key strengths and
    /// areas for improvement.
    async fn summarize(
        &self,
        score: u32,
        max_score: u32,
        history: &[HistoryEntry],
    ) -> Result<String, LlmError>;
}

/// Sum of awarded scores and the maximum attainable for the tasks attempted.
pub fn tally(history: &[HistoryEntry]) -> (u32, u32) {
    let score = history.iter().map(|e| e.evaluation.score).sum::<u32>();
    let max_score = history.len() as u32 * MAX_TASK_SCORE;
    (score, max_score)
}

/// Places the narrative beneath the fixed header carrying the score line.
pub fn render_report(score: u32, max_score: u32, narrative: &str) -> String {
    format!(
        "## Interview Summary\n\n**Final Score: {score} / {max_score}**\n\n{}",
        narrative.trim()
    )
}

/// Synthesizer backed by the shared `LlmClient`.
pub struct LlmReportSynthesizer {
    llm: LlmClient,
}

impl LlmReportSynthesizer {
    pub fn new(llm: LlmClient) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl ReportSynthesizer for LlmReportSynthesizer {
    async fn summarize(
        &self,
        score: u32,
        max_score: u32,
        history: &[HistoryEntry],
    ) -> Result<String, LlmError> {
        let prompt = build_report_prompt(score, max_score, history)?;
        info!(score, max_score, tasks = history.len(), "Synthesizing final report");
        self.llm.call_text(&prompt, REPORT_SYSTEM, None).await
    }
}

fn build_report_prompt(
    score: u32,
    max_score: u32,
    history: &[HistoryEntry],
) -> Result<String, LlmError> {
    let history_json = serde_json::to_string_pretty(history)?;
    Ok(REPORT_PROMPT_TEMPLATE
        .replace("{no_correspondence}", NO_CORRESPONDENCE_INSTRUCTION)
        .replace("{score}", &score.to_string())
        .replace("{max_score}", &max_score.to_string())
        .replace("{history_json}", &history_json))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interview::state::{Evaluation, Verdict};

    fn entry(task_id: &str, score: u32) -> HistoryEntry {
        HistoryEntry {
            task_id: task_id.to_string(),
            title: format!("Title {task_id}"),
            evaluation: Evaluation::new(score, "fine"),
            verification: Verdict::NotApplicable,
        }
    }

    #[test]
    fn test_tally_sums_scores_and_scales_max() {
        let history = vec![entry("t1", 7), entry("t2", 9)];
        assert_eq!(tally(&history), (16, 20));
    }

    #[test]
    fn test_tally_empty_history() {
        assert_eq!(tally(&[]), (0, 0));
    }

    #[test]
    fn test_render_report_header() {
        let report = render_report(16, 20, "\n**Overall Performance:** Good.\n");
        assert!(report.starts_with("## Interview Summary\n\n**Final Score: 16 / 20**\n\n"));
        assert!(report.ends_with("**Overall Performance:** Good."));
    }

    #[test]
    fn test_report_prompt_embeds_score_and_history() {
        let history = vec![entry("task_4", 6)];
        let prompt = build_report_prompt(6, 10, &history).unwrap();
        assert!(prompt.contains("Final Score: 6 / 10."));
        assert!(prompt.contains("\"task_id\": \"task_4\""));
        assert!(prompt.contains("**Areas for Improvement:**"));
        assert!(prompt.contains("DO NOT write an email"));
    }
}
