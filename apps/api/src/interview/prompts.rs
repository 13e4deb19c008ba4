// All LLM prompt constants for the interview module.
// Reuses cross-cutting fragments from llm_client::prompts.

/// Examiner role for submission evaluation. Sent together with `JSON_ONLY_SYSTEM`.
pub const EVALUATION_ROLE: &str = "You are a strict but fair spreadsheet skills examiner. \
    You grade a candidate's answer to one practical task against a rubric of key concepts.";

/// Evaluation prompt template.
/// Replace: {key_concepts}, {submission}
pub const EVALUATION_PROMPT_TEMPLATE: &str = r#"**RUBRIC - Key Concepts:** {key_concepts}
{submission}
Give a score from 0-10. Your response MUST be ONLY a valid JSON object with keys "score" (int) and "feedback" (str)."#;

/// Submission block when both an explanation and a screenshot were sent.
/// Replace: {explanation}
pub const SUBMISSION_TEXT_AND_IMAGE: &str = r#"**SUBMISSION (Text & Image):**
- Explanation: "{explanation}"
**INSTRUCTIONS:** Analyze BOTH the text and the attached image."#;

/// Submission block for an explanation only.
/// Replace: {explanation}
pub const SUBMISSION_TEXT_ONLY: &str = r#"**SUBMISSION (Text Only):**
- Explanation: "{explanation}"
**INSTRUCTIONS:** Evaluate the text on its own."#;

/// Submission block for a screenshot only.
pub const SUBMISSION_IMAGE_ONLY: &str = "**SUBMISSION (Image Only):**\n\
    **INSTRUCTIONS:** Evaluate the attached image on its own.";

/// System prompt for the final report narrative.
pub const REPORT_SYSTEM: &str = "You are an assessment analyst summarizing a candidate's \
    results in a practical spreadsheet skills test. Write in markdown.";

/// Report narrative prompt template.
/// Replace: {no_correspondence}, {score}, {max_score}, {history_json}
pub const REPORT_PROMPT_TEMPLATE: &str = r#"Synthesize the results of this spreadsheet test into a short, analytical summary.
Final Score: {score} / {max_score}.
Detailed Results (JSON, one object per task, with evaluator feedback and numeric answer verification):
{history_json}

{no_correspondence}
Structure your response with these exact markdown headings:
- **Overall Performance:** (A one-sentence overview)
- **Key Strengths:** (Bulleted list)
- **Areas for Improvement:** (Bulleted list)"#;
