//! Checks numbers stated in an explanation against a task's reference answer.
//!
//! Verification is informational: it is recorded in the history and shown to the report
//! synthesizer, but it never changes the evaluator's score.

use lazy_static::lazy_static;
use regex::Regex;

use super::state::Verdict;

/// Allowed absolute difference between a stated and a reference answer.
const TOLERANCE: f64 = 0.01;

lazy_static! {
    /// Grouped thousands (`1,234,567.8`) first, then plain digits with an optional fraction.
    static ref NUMBER: Regex =
        Regex::new(r"\d{1,3}(?:,\d{3})+(?:\.\d+)?\b|\d+(?:\.\d+)?").unwrap();
}

/// Compares every number stated in `explanation` with `expected`.
pub fn check(expected: Option<f64>, explanation: Option<&str>) -> Verdict {
    let (Some(expected), Some(text)) = (expected, explanation) else {
        return Verdict::NotApplicable;
    };

    let stated = extract_numbers(text);
    if stated.is_empty() {
        return Verdict::NotApplicable;
    }

    if stated.iter().any(|n| (n - expected).abs() < TOLERANCE) {
        Verdict::Correct
    } else {
        Verdict::Incorrect { expected }
    }
}

/// Pulls numeric literals out of free text. Thousands separators and currency symbols
/// are tolerated: `$1,234.50` yields `1234.5`. A comma only groups digits when exactly
/// three follow it, so formula arguments like `A2,3,0` stay separate numbers.
pub fn extract_numbers(text: &str) -> Vec<f64> {
    NUMBER
        .find_iter(text)
        .filter_map(|m| m.as_str().replace(',', "").parse::<f64>().ok())
        .collect()
}
