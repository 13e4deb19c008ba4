// Shared prompt constants and prompt-building utilities.
// Each service that needs LLM calls defines its own prompts.rs alongside it.
// This file contains cross-cutting prompt fragments.

/// System prompt fragment that enforces JSON-only output.
pub const JSON_ONLY_SYSTEM: &str = "You are a precise, structured assistant. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Instruction that keeps synthesized summaries terse and free of correspondence framing.
pub const NO_CORRESPONDENCE_INSTRUCTION: &str = "\
    Your output MUST be a concise summary. \
    DO NOT write an email, a letter, greetings, or sign-offs.";
